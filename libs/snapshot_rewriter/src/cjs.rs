// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.9 CJS shape analyzer.
//!
//! Runs once per module, before and independently of the lazy rewrite, over
//! the *original* top-level statement list — it never consults the renamer
//! and never mutates the AST, so its result is unaffected by whatever the
//! statement rewriter later does to the same statements.

use crate::ast::AssignOp;
use crate::ast::Expr;
use crate::ast::MemberExpr;
use crate::ast::MemberProp;
use crate::ast::Module;
use crate::ast::ObjectProp;
use crate::ast::Stmt;
use crate::symbol::SymbolTable;

/// A best-effort summary of a module's CommonJS export surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CjsExportInfo {
  pub named_exports: Vec<String>,
  pub reexport_specifiers: Vec<String>,
  pub has_module_exports_assignment: bool,
}

impl CjsExportInfo {
  fn add_named_export(&mut self, name: impl Into<String>) {
    let name = name.into();
    if !self.named_exports.contains(&name) {
      self.named_exports.push(name);
    }
  }

  fn add_reexport(&mut self, path: impl Into<String>) {
    let path = path.into();
    if !self.reexport_specifiers.contains(&path) {
      self.reexport_specifiers.push(path);
    }
  }
}

/// Scans `module`'s top level and classifies its CommonJS export shape.
pub fn analyze_cjs_exports(module: &Module, table: &SymbolTable) -> CjsExportInfo {
  let mut info = CjsExportInfo::default();
  for stmt in &module.body {
    if let Stmt::Expr(expr) = stmt {
      classify_top_level_expr(expr, table, &mut info);
    }
  }
  info
}

fn classify_top_level_expr(expr: &Expr, table: &SymbolTable, info: &mut CjsExportInfo) {
  match expr {
    Expr::Assign(assign) if assign.op == AssignOp::Assign => {
      if let Expr::Member(member) = assign.target.as_ref() {
        if is_simple_member(member, table, "module", "exports") {
          info.has_module_exports_assignment = true;
          if let Expr::Object(props) = assign.value.as_ref() {
            collect_object_literal_keys(props, info);
          }
          return;
        }
        if member.prop == MemberProp::Ident && is_ident_named(&member.obj, table, "exports") {
          info.add_named_export(member.prop_name.clone());
        }
      }
    }
    Expr::Call(call) => {
      classify_call(call, table, info);
      classify_bare_call(call, table, info);
    }
    _ => {}
  }
}

fn collect_object_literal_keys(props: &[ObjectProp], info: &mut CjsExportInfo) {
  for prop in props {
    // Only plain, non-computed keys describe a stable export name; a
    // computed key could be anything and isn't tracked here.
    if prop.computed_key.is_none() {
      info.add_named_export(prop.key.clone());
    }
  }
}

fn classify_call(call: &crate::ast::CallExpr, table: &SymbolTable, info: &mut CjsExportInfo) {
  let Expr::Member(callee) = call.callee.as_ref() else {
    return;
  };
  if callee.prop != MemberProp::Ident {
    return;
  }
  // Object.defineProperty(exports, "name", ...)
  if callee.prop_name == "defineProperty"
    && is_ident_named(&callee.obj, table, "Object")
    && call.args.len() >= 2
    && is_ident_named(&call.args[0].expr, table, "exports")
  {
    if let Expr::Str(name) = call.args[1].expr.as_ref() {
      info.add_named_export(name.clone());
    }
    return;
  }
  // Object.assign(exports, require("path")) — a re-export idiom emitted by
  // TS/Babel down-leveling.
  if callee.prop_name == "assign"
    && is_ident_named(&callee.obj, table, "Object")
    && call.args.len() == 2
    && is_ident_named(&call.args[0].expr, table, "exports")
  {
    if let Some(path) = plain_require_path(&call.args[1].expr, table) {
      info.add_reexport(path.to_string());
    }
  }
}

fn is_ident_named(expr: &Expr, table: &SymbolTable, name: &str) -> bool {
  match expr {
    Expr::Ident(sym) => table.original_name(*sym) == name,
    Expr::RawIdent(s) => s == name,
    _ => false,
  }
}

fn is_simple_member(member: &MemberExpr, table: &SymbolTable, obj_name: &str, prop_name: &str) -> bool {
  member.prop == MemberProp::Ident
    && member.prop_name == prop_name
    && is_ident_named(&member.obj, table, obj_name)
}

fn plain_require_path<'a>(expr: &'a Expr, table: &SymbolTable) -> Option<&'a str> {
  let Expr::Call(call) = expr else {
    return None;
  };
  if !is_ident_named(&call.callee, table, "require") || call.args.len() != 1 || call.args[0].spread
  {
    return None;
  }
  match call.args[0].expr.as_ref() {
    Expr::Str(s) => Some(s.as_str()),
    _ => None,
  }
}

/// Recognizes the `__export(exports, require("path"))` call shape at the
/// top level, in addition to `classify_call`'s `Object.assign` handling —
/// kept as a distinct top-level dispatch entry since its callee is a bare
/// identifier, not a member expression.
fn classify_bare_call(call: &crate::ast::CallExpr, table: &SymbolTable, info: &mut CjsExportInfo) {
  if !is_ident_named(&call.callee, table, "__export") || call.args.len() != 2 {
    return;
  }
  if !is_ident_named(&call.args[0].expr, table, "exports") {
    return;
  }
  if let Some(path) = plain_require_path(&call.args[1].expr, table) {
    info.add_reexport(path.to_string());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::AssignExpr;
  use crate::ast::CallExpr;
  use crate::ast::ExprOrSpread;
  use crate::symbol::SymbolKind;

  fn ident(table: &mut SymbolTable, name: &str) -> Expr {
    Expr::Ident(table.declare(name, SymbolKind::Unbound))
  }

  fn member(obj: Expr, prop_name: &str) -> Expr {
    Expr::Member(Box::new(MemberExpr {
      obj: Box::new(obj),
      prop_name: prop_name.to_string(),
      computed_prop: None,
      prop: MemberProp::Ident,
      optional: false,
    }))
  }

  #[test]
  fn module_exports_object_literal_yields_named_exports() {
    let mut table = SymbolTable::new();
    let module_exports = member(ident(&mut table, "module"), "exports");
    let a = ident(&mut table, "a");
    let module = crate::ast::Module {
      body: vec![Stmt::Expr(Expr::Assign(Box::new(AssignExpr {
        op: AssignOp::Assign,
        target: Box::new(module_exports),
        value: Box::new(Expr::Object(vec![
          ObjectProp {
            key: "a".into(),
            computed_key: None,
            value: a,
            shorthand: true,
          },
          ObjectProp {
            key: "b".into(),
            computed_key: None,
            value: Expr::Ident(table.declare("c", SymbolKind::DeclaredInScope)),
            shorthand: false,
          },
        ])),
      })))],
    };
    let info = analyze_cjs_exports(&module, &table);
    assert!(info.has_module_exports_assignment);
    assert_eq!(info.named_exports, vec!["a".to_string(), "b".to_string()]);
  }

  #[test]
  fn exports_dot_name_assignment_is_tracked() {
    let mut table = SymbolTable::new();
    let exports_name = member(ident(&mut table, "exports"), "widget");
    let module = crate::ast::Module {
      body: vec![Stmt::Expr(Expr::Assign(Box::new(AssignExpr {
        op: AssignOp::Assign,
        target: Box::new(exports_name),
        value: Box::new(Expr::Number(crate::ast::Number(1.0))),
      })))],
    };
    let info = analyze_cjs_exports(&module, &table);
    assert_eq!(info.named_exports, vec!["widget".to_string()]);
    assert!(!info.has_module_exports_assignment);
  }

  #[test]
  fn object_assign_reexport_is_tracked() {
    let mut table = SymbolTable::new();
    let object_assign = member(ident(&mut table, "Object"), "assign");
    let require_call = Expr::Call(Box::new(CallExpr {
      callee: Box::new(ident(&mut table, "require")),
      args: vec![ExprOrSpread {
        spread: false,
        expr: Box::new(Expr::Str("./other".into())),
      }],
      optional: false,
    }));
    let call = Expr::Call(Box::new(CallExpr {
      callee: Box::new(object_assign),
      args: vec![
        ExprOrSpread {
          spread: false,
          expr: Box::new(ident(&mut table, "exports")),
        },
        ExprOrSpread {
          spread: false,
          expr: Box::new(require_call),
        },
      ],
      optional: false,
    }));
    let module = crate::ast::Module {
      body: vec![Stmt::Expr(call)],
    };
    let info = analyze_cjs_exports(&module, &table);
    assert_eq!(info.reexport_specifiers, vec!["./other".to_string()]);
  }

  #[test]
  fn bare_export_helper_reexport_is_tracked() {
    let mut table = SymbolTable::new();
    let require_call = Expr::Call(Box::new(CallExpr {
      callee: Box::new(ident(&mut table, "require")),
      args: vec![ExprOrSpread {
        spread: false,
        expr: Box::new(Expr::Str("./util".into())),
      }],
      optional: false,
    }));
    let call = CallExpr {
      callee: Box::new(ident(&mut table, "__export")),
      args: vec![
        ExprOrSpread {
          spread: false,
          expr: Box::new(ident(&mut table, "exports")),
        },
        ExprOrSpread {
          spread: false,
          expr: Box::new(require_call),
        },
      ],
      optional: false,
    };
    let mut info = CjsExportInfo::default();
    classify_bare_call(&call, &table, &mut info);
    assert_eq!(info.reexport_specifiers, vec!["./util".to_string()]);
  }
}
