// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.5 Statement rewriter — the largest single component. Walks a
//! module's statement tree, tracking `uninvoked_function_depth` (module
//! level and invoked-IIFE bodies are depth `<= 0`; a genuinely uninvoked
//! function/class-method body is depth `> 0`), and at module level turns
//! qualifying declarations and assignment statements into deferred
//! accessors.

use crate::ast::dummy_span;
use crate::ast::AssignExpr;
use crate::ast::AssignOp;
use crate::ast::BinaryOp;
use crate::ast::CallExpr;
use crate::ast::Class;
use crate::ast::ClassMember;
use crate::ast::CondExpr;
use crate::ast::Expr;
use crate::ast::ExprOrSpread;
use crate::ast::ForHeadStmt;
use crate::ast::ForInit;
use crate::ast::ForStmt;
use crate::ast::Function;
use crate::ast::FunctionBody;
use crate::ast::IfStmt;
use crate::ast::MemberExpr;
use crate::ast::MemberProp;
use crate::ast::Module;
use crate::ast::ObjectProp;
use crate::ast::Pat;
use crate::ast::RawFunctionDecl;
use crate::ast::Stmt;
use crate::ast::SwitchCase;
use crate::ast::TemplateLit;
use crate::ast::TryStmt;
use crate::ast::VarDecl;
use crate::ast::VarDeclKind;
use crate::ast::VarDeclarator;
use crate::binding::extract_bindings;
use crate::binding::RequireBinding;
use crate::globals::designated_global_replacement;
use crate::globals::path_global_replacement;
use crate::prelude::TopLevelVars;
use crate::renamer::Renamer;
use crate::require_expr::extract_require_expr;
use crate::require_expr::RequireExpr;
use crate::stats::RewriteStats;
use crate::symbol::SymbolTable;

/// Per-driver-call state threaded through the whole statement walk.
pub struct RewriteContext<'a> {
  pub table: &'a SymbolTable,
  pub renamer: &'a mut Renamer,
  pub top_level_vars: &'a mut TopLevelVars,
  pub stats: &'a mut RewriteStats,
  pub should_replace_require: &'a dyn Fn(&str) -> bool,
  /// `false` when the driver's `should_rewrite_module` predicate rejected
  /// this module: no accessors are created, but require-call-shape and
  /// designated-global rewriting (the host contract) still run, since §4.10
  /// specifies those survive module-level suppression.
  pub rewriting_enabled: bool,
}

fn at_module_level(depth: i32) -> bool {
  depth <= 0
}

/// Entry point. `is_wrapped` is true iff the bundler wrapped this module in
/// a CJS shim, in which case the depth counter starts at `-1` so
/// module-level code is still rewritten despite nominally living inside a
/// function body.
pub fn rewrite_module(module: &Module, ctx: &mut RewriteContext, is_wrapped: bool) -> Module {
  let mut depth: i32 = if is_wrapped { -1 } else { 0 };
  Module {
    body: rewrite_stmt_list(&module.body, ctx, &mut depth),
  }
}

fn rewrite_stmt_list(stmts: &[Stmt], ctx: &mut RewriteContext, depth: &mut i32) -> Vec<Stmt> {
  let mut out = Vec::with_capacity(stmts.len());
  for stmt in stmts {
    rewrite_stmt(stmt, ctx, depth, &mut out);
  }
  out
}

/// Rewrites a statement that must occupy exactly one syntactic slot (an
/// `if`/`for`/`while`/labeled body). A statement that expands into several
/// output statements (a split declaration, a multi-binding accessor) is
/// wrapped in a block so the slot stays syntactically valid.
fn rewrite_nested_stmt(stmt: &Stmt, ctx: &mut RewriteContext, depth: &mut i32) -> Stmt {
  let mut out = Vec::new();
  rewrite_stmt(stmt, ctx, depth, &mut out);
  match out.len() {
    1 => out.into_iter().next().unwrap(),
    0 => Stmt::Empty,
    _ => Stmt::Block(out),
  }
}

fn rewrite_stmt(stmt: &Stmt, ctx: &mut RewriteContext, depth: &mut i32, out: &mut Vec<Stmt>) {
  match stmt {
    Stmt::VarDecl(decl) => {
      if ctx.rewriting_enabled && at_module_level(*depth) {
        rewrite_var_decl(decl, ctx, out);
      } else {
        out.push(Stmt::VarDecl(rewrite_var_decl_plain(decl, ctx, *depth)));
      }
    }
    Stmt::Expr(Expr::Assign(assign))
      if assign.op == AssignOp::Assign && ctx.rewriting_enabled && at_module_level(*depth) =>
    {
      rewrite_assign_stmt(assign, ctx, out);
    }
    Stmt::Expr(e) => out.push(Stmt::Expr(rewrite_expr(e, ctx, *depth))),
    Stmt::Block(body) => out.push(Stmt::Block(rewrite_stmt_list(body, ctx, depth))),
    Stmt::If(if_stmt) => {
      let test = rewrite_expr(&if_stmt.test, ctx, *depth);
      let cons = Box::new(rewrite_nested_stmt(&if_stmt.cons, ctx, depth));
      let alt = if_stmt
        .alt
        .as_ref()
        .map(|a| Box::new(rewrite_nested_stmt(a, ctx, depth)));
      out.push(Stmt::If(IfStmt { test, cons, alt }));
    }
    Stmt::For(f) => {
      let init = rewrite_for_init(&f.init, ctx, *depth);
      let test = f.test.as_ref().map(|e| rewrite_expr(e, ctx, *depth));
      let update = f.update.as_ref().map(|e| rewrite_expr(e, ctx, *depth));
      let body = Box::new(rewrite_nested_stmt(&f.body, ctx, depth));
      out.push(Stmt::For(ForStmt {
        init,
        test,
        update,
        body,
      }));
    }
    Stmt::ForHead(f) => {
      let left = rewrite_for_init(&f.left, ctx, *depth);
      let right = rewrite_expr(&f.right, ctx, *depth);
      let body = Box::new(rewrite_nested_stmt(&f.body, ctx, depth));
      out.push(Stmt::ForHead(ForHeadStmt {
        kind: f.kind,
        left,
        right,
        body,
      }));
    }
    Stmt::While { test, body } => {
      let test = rewrite_expr(test, ctx, *depth);
      let body = Box::new(rewrite_nested_stmt(body, ctx, depth));
      out.push(Stmt::While { test, body });
    }
    Stmt::DoWhile { test, body } => {
      let body = Box::new(rewrite_nested_stmt(body, ctx, depth));
      let test = rewrite_expr(test, ctx, *depth);
      out.push(Stmt::DoWhile { test, body });
    }
    Stmt::Try(t) => {
      let block = rewrite_stmt_list(&t.block, ctx, depth);
      let handler_body = t.handler_body.as_ref().map(|b| rewrite_stmt_list(b, ctx, depth));
      let finalizer = t.finalizer.as_ref().map(|b| rewrite_stmt_list(b, ctx, depth));
      out.push(Stmt::Try(TryStmt {
        block,
        handler_param: t.handler_param.clone(),
        handler_body,
        finalizer,
      }));
    }
    Stmt::Labeled { label, body } => {
      let body = Box::new(rewrite_nested_stmt(body, ctx, depth));
      out.push(Stmt::Labeled {
        label: label.clone(),
        body,
      });
    }
    Stmt::Break(l) => out.push(Stmt::Break(l.clone())),
    Stmt::Continue(l) => out.push(Stmt::Continue(l.clone())),
    Stmt::Return(e) => out.push(Stmt::Return(e.as_ref().map(|e| rewrite_expr(e, ctx, *depth)))),
    Stmt::Throw(e) => out.push(Stmt::Throw(rewrite_expr(e, ctx, *depth))),
    Stmt::FunctionDecl { name, function } => {
      out.push(Stmt::FunctionDecl {
        name: *name,
        function: rewrite_function_body_scoped(function, ctx, *depth),
      });
    }
    Stmt::RawFunctionDecl(rf) => {
      let mut d = *depth + 1;
      out.push(Stmt::RawFunctionDecl(RawFunctionDecl {
        name: rf.name.clone(),
        body: rewrite_stmt_list(&rf.body, ctx, &mut d),
      }));
    }
    Stmt::ClassDecl { name, class } => out.push(Stmt::ClassDecl {
      name: *name,
      class: rewrite_class(class, ctx, *depth),
    }),
    Stmt::Switch { disc, cases } => {
      let disc = rewrite_expr(disc, ctx, *depth);
      let cases = cases
        .iter()
        .map(|c| SwitchCase {
          test: c.test.as_ref().map(|e| rewrite_expr(e, ctx, *depth)),
          body: rewrite_stmt_list(&c.body, ctx, depth),
        })
        .collect();
      out.push(Stmt::Switch { disc, cases });
    }
    Stmt::Empty => out.push(Stmt::Empty),
    Stmt::SyntheticThrow { message } => out.push(Stmt::SyntheticThrow {
      message: message.clone(),
    }),
  }
}

fn rewrite_for_init(init: &ForInit, ctx: &mut RewriteContext, depth: i32) -> ForInit {
  match init {
    ForInit::VarDecl(vd) => ForInit::VarDecl(rewrite_var_decl_plain(vd, ctx, depth)),
    ForInit::Expr(e) => ForInit::Expr(rewrite_expr(e, ctx, depth)),
    ForInit::None => ForInit::None,
  }
}

/// Rewrites a declarator list that either isn't at module level, or is at
/// module level but rewriting is suppressed for this module: initializers
/// still get generic expression rewriting (nested require-call-shape and
/// designated-global substitutions), but no accessor scaffolding is added.
fn rewrite_var_decl_plain(decl: &VarDecl, ctx: &mut RewriteContext, depth: i32) -> VarDecl {
  VarDecl {
    span: decl.span,
    kind: decl.kind,
    decls: decl
      .decls
      .iter()
      .map(|d| VarDeclarator {
        span: d.span,
        name: d.name.clone(),
        init: d.init.as_ref().map(|e| rewrite_expr(e, ctx, depth)),
      })
      .collect(),
  }
}

/// §4.5 "Declarations" — the module-level, rewriting-enabled case.
fn rewrite_var_decl(decl: &VarDecl, ctx: &mut RewriteContext, out: &mut Vec<Stmt>) {
  let mut plain_decls: Vec<VarDeclarator> = Vec::new();
  for declarator in &decl.decls {
    let Some(init) = &declarator.init else {
      plain_decls.push(declarator.clone());
      continue;
    };
    match extract_require_expr(init, ctx.table, ctx.renamer, ctx.should_replace_require) {
      Some(req) => emit_declarator_accessor(declarator, &req, ctx, out),
      None if expr_references_any_replaced(init, ctx) => {
        // Step 5: a later declarator referencing an already-deferred
        // binding is itself promoted to a deferred accessor.
        emit_promoted_declarator_accessor(declarator, init, ctx, out);
      }
      None => plain_decls.push(VarDeclarator {
        span: declarator.span,
        name: declarator.name.clone(),
        init: Some(rewrite_expr(init, ctx, 0)),
      }),
    }
  }
  if !plain_decls.is_empty() {
    out.push(Stmt::VarDecl(VarDecl {
      span: decl.span,
      kind: decl.kind,
      decls: plain_decls,
    }));
  }
}

fn emit_declarator_accessor(
  declarator: &VarDeclarator,
  req: &RequireExpr,
  ctx: &mut RewriteContext,
  out: &mut Vec<Stmt>,
) {
  let Some(bindings) = extract_bindings(&declarator.name) else {
    // A pattern the binding extractor can't flatten: the validator is
    // responsible for flagging this shape, not this module — leave the
    // declarator in place with its require call still given the host
    // contract shape.
    out.push(Stmt::VarDecl(VarDecl {
      span: declarator.span,
      kind: VarDeclKind::Const,
      decls: vec![VarDeclarator {
        span: declarator.span,
        name: declarator.name.clone(),
        init: Some(require_body_expr(req, &req.path)),
      }],
    }));
    return;
  };
  for binding in &bindings {
    emit_one_accessor(binding, req, ctx, out);
  }
}

fn emit_one_accessor(binding: &RequireBinding, req: &RequireExpr, ctx: &mut RewriteContext, out: &mut Vec<Stmt>) {
  let accessor_name = register_accessor(binding, ctx);
  out.push(Stmt::VarDecl(VarDecl {
    span: dummy_span(),
    kind: VarDeclKind::Let,
    decls: vec![VarDeclarator {
      span: dummy_span(),
      name: Pat::Ident(binding.symbol),
      init: None,
    }],
  }));
  out.push(Stmt::RawFunctionDecl(RawFunctionDecl {
    name: accessor_name,
    body: vec![accessor_return_stmt(binding, req, ctx)],
  }));
}

fn register_accessor(binding: &RequireBinding, ctx: &mut RewriteContext) -> String {
  let accessor_name = format!("__get_{}__", ctx.table.original_name(binding.symbol));
  ctx.renamer
    .replace(ctx.table, binding.symbol, format!("{accessor_name}()"));
  ctx.stats.accessors_created += 1;
  log::trace!("created deferred accessor {accessor_name}");
  accessor_name
}

fn accessor_return_stmt(binding: &RequireBinding, req: &RequireExpr, ctx: &RewriteContext) -> Stmt {
  let name = ctx.renamer.name_for_binding_position(ctx.table, binding.symbol);
  let mut body_expr = require_body_expr(req, &req.path);
  if let Some(key) = &binding.destructured_key {
    body_expr = Expr::Member(Box::new(MemberExpr {
      obj: Box::new(body_expr),
      prop_name: key.clone(),
      computed_prop: None,
      prop: MemberProp::Ident,
      optional: false,
    }));
  }
  Stmt::Return(Some(self_or_body_assign(&name, body_expr)))
}

/// Builds `<id> = <id> || (<body>)`.
fn self_or_body_assign(name: &str, body_expr: Expr) -> Expr {
  Expr::Assign(Box::new(AssignExpr {
    op: AssignOp::Assign,
    target: Box::new(Expr::RawIdent(name.to_string())),
    value: Box::new(Expr::Binary {
      op: BinaryOp::LogicalOr,
      left: Box::new(Expr::RawIdent(name.to_string())),
      right: Box::new(Expr::Paren(Box::new(body_expr))),
    }),
  }))
}

fn emit_promoted_declarator_accessor(
  declarator: &VarDeclarator,
  init: &Expr,
  ctx: &mut RewriteContext,
  out: &mut Vec<Stmt>,
) {
  let symbol = match &declarator.name {
    Pat::Ident(sym) => *sym,
    _ => {
      // Promotion is only implemented for a simple identifier binding
      // (the common `const a = require('a'), b = a.foo` shape); anything
      // more exotic is left as a plain, still-rewritten statement.
      out.push(Stmt::VarDecl(VarDecl {
        span: declarator.span,
        kind: VarDeclKind::Let,
        decls: vec![VarDeclarator {
          span: declarator.span,
          name: declarator.name.clone(),
          init: Some(rewrite_expr(init, ctx, 0)),
        }],
      }));
      return;
    }
  };
  let binding = RequireBinding {
    symbol,
    destructured_key: None,
  };
  let accessor_name = register_accessor(&binding, ctx);
  // The upstream identifier inside `init` already resolves to its own
  // accessor call via the renamer, since that earlier declarator was
  // processed first in this same left-to-right walk.
  let rewritten_init = rewrite_expr(init, ctx, 0);
  out.push(Stmt::VarDecl(VarDecl {
    span: dummy_span(),
    kind: VarDeclKind::Let,
    decls: vec![VarDeclarator {
      span: dummy_span(),
      name: Pat::Ident(symbol),
      init: None,
    }],
  }));
  let name = ctx.renamer.name_for_binding_position(ctx.table, symbol);
  out.push(Stmt::RawFunctionDecl(RawFunctionDecl {
    name: accessor_name,
    body: vec![Stmt::Return(Some(self_or_body_assign(&name, rewritten_init)))],
  }));
}

/// §4.5 "Assignment statements" — `x = require(...)` / `({a,b} = require(...))`.
fn rewrite_assign_stmt(assign: &AssignExpr, ctx: &mut RewriteContext, out: &mut Vec<Stmt>) {
  match extract_require_expr(&assign.value, ctx.table, ctx.renamer, ctx.should_replace_require) {
    Some(req) => match extract_bindings_from_assign_target(&assign.target) {
      Some(bindings) if !bindings.is_empty() => {
        for binding in &bindings {
          emit_assignment_accessor(binding, &req, ctx, out);
        }
      }
      _ => out.push(Stmt::Expr(Expr::Assign(Box::new(AssignExpr {
        op: assign.op,
        target: Box::new(rewrite_expr(&assign.target, ctx, 0)),
        value: Box::new(require_body_expr(&req, &req.path)),
      })))),
    },
    None => out.push(Stmt::Expr(Expr::Assign(Box::new(AssignExpr {
      op: assign.op,
      target: Box::new(rewrite_expr(&assign.target, ctx, 0)),
      value: Box::new(rewrite_expr(&assign.value, ctx, 0)),
    })))),
  }
}

fn extract_bindings_from_assign_target(target: &Expr) -> Option<Vec<RequireBinding>> {
  match target {
    Expr::Ident(sym) => Some(vec![RequireBinding {
      symbol: *sym,
      destructured_key: None,
    }]),
    Expr::Object(props) => {
      let mut bindings = Vec::with_capacity(props.len());
      for prop in props {
        match &prop.value {
          Expr::Ident(sym) => bindings.push(RequireBinding {
            symbol: *sym,
            destructured_key: Some(prop.key.clone()),
          }),
          _ => return None,
        }
      }
      Some(bindings)
    }
    _ => None,
  }
}

fn emit_assignment_accessor(binding: &RequireBinding, req: &RequireExpr, ctx: &mut RewriteContext, out: &mut Vec<Stmt>) {
  let accessor_name = register_accessor(binding, ctx);
  ctx.top_level_vars.track(accessor_name.clone());
  let return_stmt = accessor_return_stmt(binding, req, ctx);
  let func = Function {
    name: None,
    params: vec![],
    body: FunctionBody { body: vec![return_stmt] },
    is_arrow: false,
    is_async: false,
    is_generator: false,
  };
  out.push(Stmt::Expr(Expr::Assign(Box::new(AssignExpr {
    op: AssignOp::Assign,
    target: Box::new(Expr::RawIdent(accessor_name)),
    value: Box::new(Expr::Function(Box::new(func))),
  }))));
}

/// Host-contract call shape (§4.5 "Output shape of require/import
/// expressions"): `require("path", "name", <filename fallback>, <dirname
/// fallback>)`, with the recognized chain's calls then properties applied
/// on top in that canonical order (§9 open question 2).
pub fn require_body_expr(req: &RequireExpr, resolved_name: &str) -> Expr {
  apply_chains(build_require_contract_call(&req.path, resolved_name), req)
}

fn build_require_contract_call(path: &str, resolved_name: &str) -> Expr {
  Expr::Call(Box::new(CallExpr {
    callee: Box::new(Expr::RawIdent("require".to_string())),
    args: vec![
      ExprOrSpread {
        spread: false,
        expr: Box::new(Expr::Str(path.to_string())),
      },
      ExprOrSpread {
        spread: false,
        expr: Box::new(Expr::Str(resolved_name.to_string())),
      },
      ExprOrSpread {
        spread: false,
        expr: Box::new(filename_fallback_expr("__filename2", "__filename")),
      },
      ExprOrSpread {
        spread: false,
        expr: Box::new(filename_fallback_expr("__dirname2", "__dirname")),
      },
    ],
    optional: false,
  }))
}

fn filename_fallback_expr(local_name: &str, fallback_name: &str) -> Expr {
  Expr::Cond(Box::new(CondExpr {
    test: Box::new(Expr::Binary {
      op: BinaryOp::NotEqEq,
      left: Box::new(Expr::Unary {
        op: crate::ast::UnaryOp::TypeOf,
        arg: Box::new(Expr::RawIdent(local_name.to_string())),
      }),
      right: Box::new(Expr::Str("undefined".to_string())),
    }),
    cons: Box::new(Expr::RawIdent(local_name.to_string())),
    alt: Box::new(Expr::RawIdent(fallback_name.to_string())),
  }))
}

fn apply_chains(mut expr: Expr, req: &RequireExpr) -> Expr {
  for call_args in &req.call_chain {
    expr = Expr::Call(Box::new(CallExpr {
      callee: Box::new(expr),
      args: call_args
        .iter()
        .map(|e| ExprOrSpread {
          spread: false,
          expr: Box::new(e.clone()),
        })
        .collect(),
      optional: false,
    }));
  }
  for prop in &req.prop_chain {
    expr = Expr::Member(Box::new(MemberExpr {
      obj: Box::new(expr),
      prop_name: prop.clone(),
      computed_prop: None,
      prop: MemberProp::Ident,
      optional: false,
    }));
  }
  expr
}

/// Generic expression-level rewrite, applied everywhere regardless of
/// depth: recognizes nested require-call shapes wherever they occur (a
/// bare `require('x')` statement, an argument to some other call, …) and
/// gives them the host contract shape without creating any accessor.
/// Designated-global/`__dirname`/`__filename` substitution is gated to
/// `at_module_level(depth)` — see globals.rs's module doc comment for why
/// that asymmetry with required-binding accessors (which apply at every
/// depth, via the renamer consulted at print time) is intentional.
fn rewrite_expr(expr: &Expr, ctx: &mut RewriteContext, depth: i32) -> Expr {
  if let Some(req) = extract_require_expr(expr, ctx.table, ctx.renamer, ctx.should_replace_require) {
    return require_body_expr(&req, &req.path);
  }
  if at_module_level(depth) {
    if let Expr::Ident(sym) = expr {
      if let Some(replacement) = designated_global_replacement(ctx.table, *sym) {
        ctx.stats.global_rewrites += 1;
        return replacement;
      }
      if let Some(replacement) = path_global_replacement(ctx.table, *sym) {
        ctx.stats.path_resolver_rewrites += 1;
        return replacement;
      }
    }
  }
  match expr {
    Expr::Ident(_)
    | Expr::RawIdent(_)
    | Expr::Number(_)
    | Expr::Str(_)
    | Expr::Bool(_)
    | Expr::Null
    | Expr::This
    | Expr::Verbatim(_) => expr.clone(),
    Expr::Array(items) => Expr::Array(
      items
        .iter()
        .map(|opt| opt.as_ref().map(|e| rewrite_expr_or_spread(e, ctx, depth)))
        .collect(),
    ),
    Expr::Object(props) => Expr::Object(
      props
        .iter()
        .map(|p| ObjectProp {
          key: p.key.clone(),
          computed_key: p.computed_key.as_ref().map(|e| Box::new(rewrite_expr(e, ctx, depth))),
          value: rewrite_expr(&p.value, ctx, depth),
          shorthand: p.shorthand,
        })
        .collect(),
    ),
    Expr::Template(t) => Expr::Template(TemplateLit {
      quasis: t.quasis.clone(),
      exprs: t.exprs.iter().map(|e| rewrite_expr(e, ctx, depth)).collect(),
    }),
    Expr::Function(f) => Expr::Function(Box::new(rewrite_function_body_scoped(f, ctx, depth))),
    Expr::Class(c) => Expr::Class(Box::new(rewrite_class(c, ctx, depth))),
    Expr::Call(call) => rewrite_call(call, ctx, depth),
    Expr::New(call) => Expr::New(Box::new(CallExpr {
      callee: Box::new(rewrite_expr(&call.callee, ctx, depth)),
      args: call.args.iter().map(|a| rewrite_expr_or_spread(a, ctx, depth)).collect(),
      optional: call.optional,
    })),
    Expr::Member(m) => Expr::Member(Box::new(MemberExpr {
      obj: Box::new(rewrite_expr(&m.obj, ctx, depth)),
      prop_name: m.prop_name.clone(),
      computed_prop: m.computed_prop.as_ref().map(|e| Box::new(rewrite_expr(e, ctx, depth))),
      prop: m.prop,
      optional: m.optional,
    })),
    Expr::Unary { op, arg } => Expr::Unary {
      op: *op,
      arg: Box::new(rewrite_expr(arg, ctx, depth)),
    },
    Expr::Update { op, prefix, arg } => Expr::Update {
      op: *op,
      prefix: *prefix,
      arg: Box::new(rewrite_expr(arg, ctx, depth)),
    },
    Expr::Binary { op, left, right } => Expr::Binary {
      op: *op,
      left: Box::new(rewrite_expr(left, ctx, depth)),
      right: Box::new(rewrite_expr(right, ctx, depth)),
    },
    Expr::Assign(a) => Expr::Assign(Box::new(AssignExpr {
      op: a.op,
      target: Box::new(rewrite_expr(&a.target, ctx, depth)),
      value: Box::new(rewrite_expr(&a.value, ctx, depth)),
    })),
    Expr::Cond(c) => Expr::Cond(Box::new(CondExpr {
      test: Box::new(rewrite_expr(&c.test, ctx, depth)),
      cons: Box::new(rewrite_expr(&c.cons, ctx, depth)),
      alt: Box::new(rewrite_expr(&c.alt, ctx, depth)),
    })),
    Expr::Seq(es) => Expr::Seq(es.iter().map(|e| rewrite_expr(e, ctx, depth)).collect()),
    Expr::Paren(e) => Expr::Paren(Box::new(rewrite_expr(e, ctx, depth))),
    Expr::Await(e) => Expr::Await(Box::new(rewrite_expr(e, ctx, depth))),
    Expr::Yield { arg, delegate } => Expr::Yield {
      arg: arg.as_ref().map(|e| Box::new(rewrite_expr(e, ctx, depth))),
      delegate: *delegate,
    },
  }
}

fn rewrite_expr_or_spread(e: &ExprOrSpread, ctx: &mut RewriteContext, depth: i32) -> ExprOrSpread {
  ExprOrSpread {
    spread: e.spread,
    expr: Box::new(rewrite_expr(&e.expr, ctx, depth)),
  }
}

/// A function expression/declaration not known to be directly invoked:
/// its body is already lazy, so it's walked one `uninvoked_function_depth`
/// deeper.
fn rewrite_function_body_scoped(function: &Function, ctx: &mut RewriteContext, depth: i32) -> Function {
  let mut d = depth + 1;
  Function {
    name: function.name,
    params: function.params.clone(),
    body: FunctionBody {
      body: rewrite_stmt_list(&function.body.body, ctx, &mut d),
    },
    is_arrow: function.is_arrow,
    is_async: function.is_async,
    is_generator: function.is_generator,
  }
}

/// A function whose body executes immediately (the callee of a direct
/// invocation): walked at the *same* depth as the call site.
fn rewrite_function_at_depth(function: &Function, ctx: &mut RewriteContext, depth: i32) -> Function {
  let mut d = depth;
  Function {
    name: function.name,
    params: function.params.clone(),
    body: FunctionBody {
      body: rewrite_stmt_list(&function.body.body, ctx, &mut d),
    },
    is_arrow: function.is_arrow,
    is_async: function.is_async,
    is_generator: function.is_generator,
  }
}

fn rewrite_class(class: &Class, ctx: &mut RewriteContext, depth: i32) -> Class {
  Class {
    name: class.name,
    super_class: class.super_class.as_ref().map(|e| Box::new(rewrite_expr(e, ctx, depth))),
    members: class.members.iter().map(|m| rewrite_class_member(m, ctx, depth)).collect(),
  }
}

fn rewrite_class_member(member: &ClassMember, ctx: &mut RewriteContext, depth: i32) -> ClassMember {
  ClassMember {
    key: member.key.clone(),
    is_static: member.is_static,
    // A field initializer runs at class-definition time, not when a method
    // is later invoked, so it stays at the surrounding depth.
    value: member.value.as_ref().map(|e| rewrite_expr(e, ctx, depth)),
    method: member
      .method
      .as_ref()
      .map(|f| rewrite_function_body_scoped(f, ctx, depth)),
  }
}

fn rewrite_call(call: &CallExpr, ctx: &mut RewriteContext, depth: i32) -> Expr {
  if let Some(invoked_fn) = direct_invocation_target(&call.callee) {
    let callee = rewrite_invoked_callee(&call.callee, invoked_fn, ctx, depth);
    let args = call.args.iter().map(|a| rewrite_expr_or_spread(a, ctx, depth)).collect();
    return Expr::Call(Box::new(CallExpr {
      callee: Box::new(callee),
      args,
      optional: call.optional,
    }));
  }
  let callee = rewrite_expr(&call.callee, ctx, depth);
  let args = call.args.iter().map(|a| rewrite_expr_or_spread(a, ctx, depth)).collect();
  Expr::Call(Box::new(CallExpr {
    callee: Box::new(callee),
    args,
    optional: call.optional,
  }))
}

/// `(function(){...})()`, `(function(){...}).call(...)`,
/// `(function(){...}).apply(...)` — the three direct-invocation shapes
/// that keep an inline function body at the surrounding depth rather than
/// treating it as a genuinely uninvoked (already-lazy) function.
fn direct_invocation_target(callee: &Expr) -> Option<&Function> {
  match unwrap_paren(callee) {
    Expr::Function(f) => Some(f),
    Expr::Member(m) if m.prop == MemberProp::Ident && matches!(m.prop_name.as_str(), "call" | "apply") => {
      match unwrap_paren(&m.obj) {
        Expr::Function(f) => Some(f),
        _ => None,
      }
    }
    _ => None,
  }
}

fn unwrap_paren(expr: &Expr) -> &Expr {
  match expr {
    Expr::Paren(inner) => unwrap_paren(inner),
    other => other,
  }
}

fn rewrite_invoked_callee(callee: &Expr, func: &Function, ctx: &mut RewriteContext, depth: i32) -> Expr {
  match callee {
    Expr::Paren(inner) => Expr::Paren(Box::new(rewrite_invoked_callee(inner, func, ctx, depth))),
    Expr::Function(_) => Expr::Function(Box::new(rewrite_function_at_depth(func, ctx, depth))),
    Expr::Member(m) => Expr::Member(Box::new(MemberExpr {
      obj: Box::new(rewrite_invoked_callee(&m.obj, func, ctx, depth)),
      prop_name: m.prop_name.clone(),
      computed_prop: None,
      prop: m.prop,
      optional: m.optional,
    })),
    other => other.clone(),
  }
}

/// Whether `expr` contains any reference to a symbol that already has a
/// deferred-accessor record — used to detect step 5's "later declarator
/// references an earlier deferred binding" promotion case. Deliberately
/// does not descend into nested function/class bodies: a reference there
/// is resolved at call time by the renamer regardless, not by this
/// statement's own promotion logic.
fn expr_references_any_replaced(expr: &Expr, ctx: &RewriteContext) -> bool {
  match expr {
    Expr::Ident(sym) => ctx.renamer.has_been_replaced(ctx.table, *sym),
    Expr::RawIdent(_)
    | Expr::Number(_)
    | Expr::Str(_)
    | Expr::Bool(_)
    | Expr::Null
    | Expr::This
    | Expr::Verbatim(_)
    | Expr::Function(_)
    | Expr::Class(_) => false,
    Expr::Array(items) => items
      .iter()
      .flatten()
      .any(|e| expr_references_any_replaced(&e.expr, ctx)),
    Expr::Object(props) => props.iter().any(|p| {
      expr_references_any_replaced(&p.value, ctx)
        || p.computed_key.as_deref().is_some_and(|e| expr_references_any_replaced(e, ctx))
    }),
    Expr::Template(t) => t.exprs.iter().any(|e| expr_references_any_replaced(e, ctx)),
    Expr::Call(c) | Expr::New(c) => {
      expr_references_any_replaced(&c.callee, ctx) || c.args.iter().any(|a| expr_references_any_replaced(&a.expr, ctx))
    }
    Expr::Member(m) => {
      expr_references_any_replaced(&m.obj, ctx)
        || m.computed_prop.as_deref().is_some_and(|e| expr_references_any_replaced(e, ctx))
    }
    Expr::Unary { arg, .. } | Expr::Update { arg, .. } => expr_references_any_replaced(arg, ctx),
    Expr::Binary { left, right, .. } => {
      expr_references_any_replaced(left, ctx) || expr_references_any_replaced(right, ctx)
    }
    Expr::Assign(a) => expr_references_any_replaced(&a.target, ctx) || expr_references_any_replaced(&a.value, ctx),
    Expr::Cond(c) => {
      expr_references_any_replaced(&c.test, ctx)
        || expr_references_any_replaced(&c.cons, ctx)
        || expr_references_any_replaced(&c.alt, ctx)
    }
    Expr::Seq(es) => es.iter().any(|e| expr_references_any_replaced(e, ctx)),
    Expr::Paren(e) | Expr::Await(e) => expr_references_any_replaced(e, ctx),
    Expr::Yield { arg, .. } => arg.as_deref().is_some_and(|e| expr_references_any_replaced(e, ctx)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::Number;
  use crate::ast::ObjectPatProp;
  use crate::symbol::SymbolKind;

  fn ctx_parts() -> (SymbolTable, Renamer, TopLevelVars, RewriteStats) {
    (
      SymbolTable::new(),
      Renamer::new(),
      TopLevelVars::new(),
      RewriteStats::new(),
    )
  }

  fn require_call(require_sym: crate::symbol::SymbolId, path: &str) -> Expr {
    Expr::Call(Box::new(CallExpr {
      callee: Box::new(Expr::Ident(require_sym)),
      args: vec![ExprOrSpread {
        spread: false,
        expr: Box::new(Expr::Str(path.to_string())),
      }],
      optional: false,
    }))
  }

  #[test]
  fn simple_require_declaration_becomes_accessor_pair() {
    let (mut table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let require_sym = table.declare("require", SymbolKind::Unbound);
    let foo = table.declare("foo", SymbolKind::DeclaredInScope);
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: true,
    };
    let decl = VarDecl {
      span: dummy_span(),
      kind: VarDeclKind::Const,
      decls: vec![VarDeclarator {
        span: dummy_span(),
        name: Pat::Ident(foo),
        init: Some(require_call(require_sym, "./foo")),
      }],
    };
    let module = Module {
      body: vec![Stmt::VarDecl(decl)],
    };
    let rewritten = rewrite_module(&module, &mut ctx, false);
    assert_eq!(rewritten.body.len(), 2);
    assert!(matches!(rewritten.body[0], Stmt::VarDecl(_)));
    assert!(matches!(rewritten.body[1], Stmt::RawFunctionDecl(_)));
    assert_eq!(stats.accessors_created, 1);
  }

  #[test]
  fn destructured_require_produces_two_accessors() {
    let (mut table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let require_sym = table.declare("require", SymbolKind::Unbound);
    let foo = table.declare("foo", SymbolKind::DeclaredInScope);
    let bar = table.declare("bar", SymbolKind::DeclaredInScope);
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: true,
    };
    let pat = Pat::Object {
      props: vec![
        ObjectPatProp {
          key: "foo".into(),
          value: Pat::Ident(foo),
        },
        ObjectPatProp {
          key: "bar".into(),
          value: Pat::Ident(bar),
        },
      ],
      has_unsupported_shape: false,
    };
    let decl = VarDecl {
      span: dummy_span(),
      kind: VarDeclKind::Const,
      decls: vec![VarDeclarator {
        span: dummy_span(),
        name: pat,
        init: Some(require_call(require_sym, "foo-bar")),
      }],
    };
    let module = Module {
      body: vec![Stmt::VarDecl(decl)],
    };
    let rewritten = rewrite_module(&module, &mut ctx, false);
    // Two bindings, each emitting a `let`+accessor-function pair.
    assert_eq!(rewritten.body.len(), 4);
    assert_eq!(stats.accessors_created, 2);
  }

  #[test]
  fn assignment_form_tracks_top_level_var() {
    let (mut table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let require_sym = table.declare("require", SymbolKind::Unbound);
    let a = table.declare("a", SymbolKind::DeclaredInScope);
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: true,
    };
    let assign = Stmt::Expr(Expr::Assign(Box::new(AssignExpr {
      op: AssignOp::Assign,
      target: Box::new(Expr::Ident(a)),
      value: Box::new(require_call(require_sym, "a")),
    })));
    let module = Module { body: vec![assign] };
    let rewritten = rewrite_module(&module, &mut ctx, false);
    assert_eq!(rewritten.body.len(), 1);
    assert!(matches!(rewritten.body[0], Stmt::Expr(Expr::Assign(_))));
    assert!(!top_level_vars.is_empty());
    assert_eq!(top_level_vars.names(), &["__get_a__".to_string()]);
  }

  #[test]
  fn module_scope_console_becomes_accessor_call() {
    let (mut table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let console = table.declare("console", SymbolKind::Unbound);
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: true,
    };
    let log_call = Expr::Call(Box::new(CallExpr {
      callee: Box::new(Expr::Member(Box::new(MemberExpr {
        obj: Box::new(Expr::Ident(console)),
        prop_name: "log".into(),
        computed_prop: None,
        prop: MemberProp::Ident,
        optional: false,
      }))),
      args: vec![ExprOrSpread {
        spread: false,
        expr: Box::new(Expr::Str("x".into())),
      }],
      optional: false,
    }));
    let module = Module {
      body: vec![Stmt::Expr(log_call)],
    };
    let rewritten = rewrite_module(&module, &mut ctx, false);
    match &rewritten.body[0] {
      Stmt::Expr(Expr::Call(call)) => match call.callee.as_ref() {
        Expr::Member(m) => match m.obj.as_ref() {
          Expr::RawIdent(s) => assert_eq!(s, "get_console()"),
          other => panic!("unexpected object {other:?}"),
        },
        other => panic!("unexpected callee {other:?}"),
      },
      other => panic!("unexpected statement {other:?}"),
    }
    assert_eq!(stats.global_rewrites, 1);
  }

  #[test]
  fn console_inside_uninvoked_function_is_untouched_at_global_rewrite_site() {
    let (mut table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let console = table.declare("console", SymbolKind::Unbound);
    let id_fn_name = table.declare("id", SymbolKind::DeclaredInScope);
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: true,
    };
    let body_stmt = Stmt::Expr(Expr::Call(Box::new(CallExpr {
      callee: Box::new(Expr::Member(Box::new(MemberExpr {
        obj: Box::new(Expr::Ident(console)),
        prop_name: "log".into(),
        computed_prop: None,
        prop: MemberProp::Ident,
        optional: false,
      }))),
      args: vec![],
      optional: false,
    })));
    let function_decl = Stmt::FunctionDecl {
      name: id_fn_name,
      function: Function {
        name: Some(id_fn_name),
        params: vec![],
        body: FunctionBody { body: vec![body_stmt] },
        is_arrow: false,
        is_async: false,
        is_generator: false,
      },
    };
    let module = Module {
      body: vec![function_decl],
    };
    let rewritten = rewrite_module(&module, &mut ctx, false);
    assert_eq!(stats.global_rewrites, 0);
    match &rewritten.body[0] {
      Stmt::FunctionDecl { function, .. } => match &function.body.body[0] {
        Stmt::Expr(Expr::Call(call)) => match call.callee.as_ref() {
          Expr::Member(m) => assert!(matches!(m.obj.as_ref(), Expr::Ident(_))),
          other => panic!("unexpected callee {other:?}"),
        },
        other => panic!("unexpected statement {other:?}"),
      },
      other => panic!("unexpected statement {other:?}"),
    }
  }

  #[test]
  fn reference_inside_uninvoked_function_resolves_through_renamer() {
    // Mirrors the scenario where a later-invoked function body references
    // an already-deferred binding: the statement rewriter leaves the
    // `Expr::Ident` node alone, and it's the renamer (consulted by the
    // printer) that turns it into the accessor call at print time.
    let mut table = SymbolTable::new();
    let foo = table.declare("foo", SymbolKind::DeclaredInScope);
    let mut renamer = Renamer::new();
    renamer.replace(&table, foo, "__get_foo__()");
    assert_eq!(renamer.name_for(&table, foo), "__get_foo__()");
  }

  #[test]
  fn bound_local_shadowing_a_global_is_not_rewritten() {
    let (mut table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let process_bound = table.declare("process", SymbolKind::DeclaredInScope);
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: true,
    };
    let expr = Expr::Member(Box::new(MemberExpr {
      obj: Box::new(Expr::Ident(process_bound)),
      prop_name: "b".into(),
      computed_prop: None,
      prop: MemberProp::Ident,
      optional: false,
    }));
    let rewritten = rewrite_expr(&expr, &mut ctx, 0);
    assert!(matches!(rewritten, Expr::Member(m) if matches!(*m.obj, Expr::Ident(_))));
    assert_eq!(stats.global_rewrites, 0);
  }

  #[test]
  fn disabled_rewriting_still_applies_require_call_shape() {
    let (mut table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let require_sym = table.declare("require", SymbolKind::Unbound);
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: false,
    };
    let decl = VarDecl {
      span: dummy_span(),
      kind: VarDeclKind::Const,
      decls: vec![VarDeclarator {
        span: dummy_span(),
        name: Pat::Ident(table.declare("foo", SymbolKind::DeclaredInScope)),
        init: Some(require_call(require_sym, "./foo")),
      }],
    };
    let module = Module {
      body: vec![Stmt::VarDecl(decl)],
    };
    let rewritten = rewrite_module(&module, &mut ctx, false);
    assert_eq!(rewritten.body.len(), 1);
    assert_eq!(stats.accessors_created, 0);
    match &rewritten.body[0] {
      Stmt::VarDecl(vd) => match vd.decls[0].init.as_ref().unwrap() {
        Expr::Call(call) => assert_eq!(call.args.len(), 4),
        other => panic!("unexpected init {other:?}"),
      },
      other => panic!("unexpected statement {other:?}"),
    }
  }

  #[test]
  fn number_literal_is_unaffected() {
    let (table, mut renamer, mut top_level_vars, mut stats) = ctx_parts();
    let always_true = |_: &str| true;
    let mut ctx = RewriteContext {
      table: &table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: &always_true,
      rewriting_enabled: true,
    };
    let rewritten = rewrite_expr(&Expr::Number(Number(1.5)), &mut ctx, 0);
    assert!(matches!(rewritten, Expr::Number(Number(n)) if n == 1.5));
  }
}
