// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.6 AST validator — runs inline during printing (driven by the printer
//! calling into it at the relevant node kinds) rather than as a separate
//! tree walk, so diagnostics carry the byte offset the printer had already
//! reached (§9 open question 3: a best-effort, advisory offset only).

use crate::ast::CondExpr;
use crate::ast::Expr;
use crate::ast::IfStmt;
use crate::ast::MemberExpr;
use crate::ast::Stmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
  /// The offending region was replaced with a runtime `throw`; the host
  /// observes a failed snapshot attempt and defers the module.
  Defer,
  /// The module may still snapshot; a known risky construct was observed.
  NoRewrite,
}

/// `strict` additionally flags any `__dirname`/`__filename` reference that
/// survived printing unrewritten; `lenient` accepts it silently (the host
/// runtime may supply fallbacks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
  Strict,
  Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
  pub kind: ValidationKind,
  pub message: String,
  /// Best-effort byte offset into the *printed* output, not a precise AST
  /// location — see §9 open question 3.
  pub offset: usize,
}

impl ValidationError {
  fn defer(message: impl Into<String>, offset: usize) -> Self {
    Self {
      kind: ValidationKind::Defer,
      message: message.into(),
      offset,
    }
  }

  fn no_rewrite(message: impl Into<String>, offset: usize) -> Self {
    Self {
      kind: ValidationKind::NoRewrite,
      message: message.into(),
      offset,
    }
  }
}

/// Returns `true` if `expr` can be evaluated to a constant truth value
/// using only the rewriter's static knowledge (literals, `typeof x ===
/// '...'` against a known-absent global, simple boolean/number/string
/// literals combined with `&&`/`||`/`!`). Anything depending on a value
/// only known at runtime (a deferred accessor call, a designated-global
/// read, a bare identifier) is not constant-foldable.
pub fn is_constant_foldable(expr: &Expr) -> bool {
  match expr {
    Expr::Bool(_) | Expr::Number(_) | Expr::Str(_) | Expr::Null => true,
    Expr::Unary {
      op: crate::ast::UnaryOp::Bang,
      arg,
    } => is_constant_foldable(arg),
    Expr::Binary { op, left, right } => {
      matches!(
        op,
        crate::ast::BinaryOp::LogicalAnd
          | crate::ast::BinaryOp::LogicalOr
          | crate::ast::BinaryOp::EqEqEq
          | crate::ast::BinaryOp::NotEqEq
      ) && is_constant_foldable(left)
        && is_constant_foldable(right)
    }
    Expr::Paren(inner) => is_constant_foldable(inner),
    _ => false,
  }
}

/// Validates an `if` statement's test. If the test isn't constant-
/// foldable, replaces the consequent (and any alternate) with an empty
/// block and reports a `Defer` diagnostic, per §4.6.
pub fn validate_if_test(stmt: IfStmt, offset: usize, errors: &mut Vec<ValidationError>) -> IfStmt {
  if is_constant_foldable(&stmt.test) {
    return stmt;
  }
  errors.push(ValidationError::defer(
    "if-test is not verifiable at snapshot time",
    offset,
  ));
  IfStmt {
    test: stmt.test,
    cons: Box::new(Stmt::Block(vec![])),
    alt: stmt.alt.map(|_| {
      Box::new(Stmt::SyntheticThrow {
        message: "module deferred: unverifiable if-test".to_string(),
      })
    }),
  }
}

/// Validates a conditional (`? :`) expression. If either branch references
/// a forbidden target, the whole conditional is replaced with a
/// synthesized throw expression, represented here as `Err` carrying the
/// diagnostic; the caller (printer) is responsible for emitting the throw
/// in expression position.
pub fn validate_cond_expr(
  cond: CondExpr,
  references_forbidden_target: impl Fn(&Expr) -> bool,
  offset: usize,
  errors: &mut Vec<ValidationError>,
) -> Result<CondExpr, ValidationError> {
  if references_forbidden_target(&cond.cons) || references_forbidden_target(&cond.alt) {
    let err = ValidationError::defer(
      "conditional branch references a forbidden snapshot-unsafe target",
      offset,
    );
    errors.push(err.clone());
    return Err(err);
  }
  Ok(cond)
}

/// Checks an expression-statement's top-level expression for a forbidden
/// LHS write (e.g. `process.emitWarning = ...`). Returns `Some` diagnostic
/// (informational only — the statement is kept) if found.
pub fn check_forbidden_assignment_target(
  target: &Expr,
  is_forbidden_member: impl Fn(&MemberExpr) -> bool,
  offset: usize,
) -> Option<ValidationError> {
  if let Expr::Member(member) = target {
    if is_forbidden_member(member) {
      return Some(ValidationError::no_rewrite(
        format!("write to forbidden member `.{}`", member.prop_name),
        offset,
      ));
    }
  }
  None
}

/// Strict-mode post-print scan: reports a `NoRewrite` diagnostic for each
/// bare `__dirname`/`__filename` token that survived in `printed_output`
/// outside of a `__resolve_path(...)` call. Lenient mode never calls this.
pub fn scan_for_unrewritten_path_globals(printed_output: &str) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  for name in ["__dirname", "__filename"] {
    let mut search_from = 0usize;
    while let Some(rel) = printed_output[search_from..].find(name) {
      let offset = search_from + rel;
      let preceding = &printed_output[..offset];
      if !preceding.trim_end().ends_with("__resolve_path(") {
        errors.push(ValidationError::no_rewrite(
          format!("unrewritten reference to `{name}`"),
          offset,
        ));
      }
      search_from = offset + name.len();
    }
  }
  errors
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::Number;

  #[test]
  fn literal_test_is_foldable() {
    assert!(is_constant_foldable(&Expr::Bool(true)));
    assert!(is_constant_foldable(&Expr::Number(Number(0.0))));
  }

  #[test]
  fn identifier_test_is_not_foldable() {
    assert!(!is_constant_foldable(&Expr::RawIdent("x".into())));
  }

  #[test]
  fn unverifiable_if_test_clears_body_and_defers() {
    let stmt = IfStmt {
      test: Expr::RawIdent("maybeLazy".into()),
      cons: Box::new(Stmt::Expr(Expr::Null)),
      alt: None,
    };
    let mut errors = Vec::new();
    let rewritten = validate_if_test(stmt, 10, &mut errors);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationKind::Defer);
    assert!(matches!(*rewritten.cons, Stmt::Block(ref b) if b.is_empty()));
  }

  #[test]
  fn foldable_if_test_is_left_alone() {
    let stmt = IfStmt {
      test: Expr::Bool(true),
      cons: Box::new(Stmt::Expr(Expr::Null)),
      alt: None,
    };
    let mut errors = Vec::new();
    let rewritten = validate_if_test(stmt, 0, &mut errors);
    assert!(errors.is_empty());
    assert!(matches!(*rewritten.cons, Stmt::Expr(Expr::Null)));
  }

  #[test]
  fn forbidden_assignment_target_is_reported() {
    let member = MemberExpr {
      obj: Box::new(Expr::RawIdent("process".into())),
      prop_name: "emitWarning".into(),
      computed_prop: None,
      prop: crate::ast::MemberProp::Ident,
      optional: false,
    };
    let target = Expr::Member(Box::new(member));
    let err = check_forbidden_assignment_target(&target, |m| m.prop_name == "emitWarning", 5);
    assert!(err.is_some());
    assert_eq!(err.unwrap().kind, ValidationKind::NoRewrite);
  }

  #[test]
  fn post_print_scan_flags_bare_dirname() {
    let errors = scan_for_unrewritten_path_globals("console.log(__dirname)");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "unrewritten reference to `__dirname`");
  }

  #[test]
  fn post_print_scan_ignores_resolved_dirname() {
    let errors = scan_for_unrewritten_path_globals("console.log(__resolve_path(__dirname))");
    assert!(errors.is_empty());
  }
}
