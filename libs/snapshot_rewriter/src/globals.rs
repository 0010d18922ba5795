// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.4 Global rewriter.
//!
//! The designated-globals set is a `const` slice (per the "Global state"
//! design note: nothing here needs to be mutable or runtime-configured).
//!
//! Unlike required-binding accessors (which, once recorded, replace every
//! reference to the symbol anywhere in the module — including deep inside
//! uninvoked function bodies, per SPEC_FULL §8 scenario 3), designated
//! globals and `__dirname`/`__filename` are rewritten only at occurrences
//! the statement rewriter visits directly at module level
//! (`uninvoked_function_depth == 0`, including an invoked IIFE's body).
//! That is a property of *where* the rewriter walks, not of the symbol
//! table, so this module performs a direct per-occurrence AST substitution
//! rather than recording anything in the [`crate::renamer::Renamer`].

use crate::ast::Expr;
use crate::symbol::SymbolId;
use crate::symbol::SymbolTable;

/// Identifiers whose *unbound* module-scope reads get rewritten to
/// `get_<name>()`.
pub const DESIGNATED_GLOBALS: &[&str] = &["process", "document", "global", "window", "console"];

pub fn is_designated_global(name: &str) -> bool {
  DESIGNATED_GLOBALS.contains(&name)
}

/// If `sym` is an unbound reference to a designated global, returns the
/// `get_<name>()` replacement expression for this specific occurrence.
pub fn designated_global_replacement(table: &SymbolTable, sym: SymbolId) -> Option<Expr> {
  if !table.is_unbound(sym) {
    return None;
  }
  let name = table.original_name(sym);
  if !is_designated_global(name) {
    return None;
  }
  Some(Expr::RawIdent(format!("get_{name}()")))
}

/// If `sym` is an unbound reference to `__dirname`/`__filename`, returns the
/// `__resolve_path(...)` replacement expression for this occurrence.
/// Bundler-wrapped modules bind these names as real function parameters
/// (see the wrapper-scope note in SPEC_FULL §4.5), so such occurrences are
/// already `DeclaredInScope` and `table.is_unbound` naturally excludes
/// them without any special-casing here.
pub fn path_global_replacement(table: &SymbolTable, sym: SymbolId) -> Option<Expr> {
  if !table.is_unbound(sym) {
    return None;
  }
  let name = table.original_name(sym);
  if name != "__dirname" && name != "__filename" {
    return None;
  }
  Some(Expr::Call(Box::new(crate::ast::CallExpr {
    callee: Box::new(Expr::RawIdent("__resolve_path".to_string())),
    args: vec![crate::ast::ExprOrSpread {
      spread: false,
      expr: Box::new(Expr::RawIdent(name.to_string())),
    }],
    optional: false,
  })))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::symbol::SymbolKind;

  #[test]
  fn unbound_console_is_rewritten() {
    let mut table = SymbolTable::new();
    let console = table.declare("console", SymbolKind::Unbound);
    let replacement = designated_global_replacement(&table, console);
    assert!(matches!(replacement, Some(Expr::RawIdent(s)) if s == "get_console()"));
  }

  #[test]
  fn bound_process_is_untouched() {
    let mut table = SymbolTable::new();
    let process = table.declare("process", SymbolKind::DeclaredInScope);
    assert!(designated_global_replacement(&table, process).is_none());
  }

  #[test]
  fn non_designated_unbound_name_is_untouched() {
    let mut table = SymbolTable::new();
    let foo = table.declare("foo", SymbolKind::Unbound);
    assert!(designated_global_replacement(&table, foo).is_none());
  }

  #[test]
  fn unbound_dirname_resolves_path() {
    let mut table = SymbolTable::new();
    let dirname = table.declare("__dirname", SymbolKind::Unbound);
    assert!(path_global_replacement(&table, dirname).is_some());
  }

  #[test]
  fn wrapped_param_dirname_is_untouched() {
    let mut table = SymbolTable::new();
    let dirname = table.declare("__dirname", SymbolKind::DeclaredInScope);
    assert!(path_global_replacement(&table, dirname).is_none());
  }
}
