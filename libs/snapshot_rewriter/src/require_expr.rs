// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.2 Require-shape extractor.
//!
//! Recognizes an expression of the shape
//! `require("p")(c1)...(ck).p1...pm` (property accesses and call chains in
//! any interleaving) and flattens it into an ordered [`RequireExpr`],
//! regardless of whether the source leans left (`require(x).a.b`) or right
//! (deeply nested calls). The "coroutine-like" trick described in the
//! design notes: depths are counted on the way down, and chain slots are
//! filled on the way back up, so the final order always matches emission
//! order.

use crate::ast::Expr;
use crate::ast::MemberProp;
use crate::renamer::Renamer;
use crate::symbol::SymbolTable;

/// The classified view of a `require(...)`-rooted expression.
#[derive(Debug, Clone, PartialEq)]
pub struct RequireExpr {
  /// The string literal passed to `require`.
  pub path: String,
  /// `.prop` names, in the order they appear in the source (left to
  /// right).
  pub prop_chain: Vec<String>,
  /// Each element is one `(...)` call's argument list, in source order.
  /// Argument expressions are opaque to the extractor (it doesn't inspect
  /// them further).
  pub call_chain: Vec<Vec<Expr>>,
}

/// Attempts to classify `expr` as a [`RequireExpr`]. `should_replace_require`
/// is the caller-supplied predicate from SPEC_FULL §6 — a bare
/// `require("external")` where the predicate returns `false` is not
/// recognized at all, so it is left completely alone by every later stage.
pub fn extract_require_expr(
  expr: &Expr,
  table: &SymbolTable,
  renamer: &Renamer,
  should_replace_require: &dyn Fn(&str) -> bool,
) -> Option<RequireExpr> {
  let (path, prop_chain, call_chain) =
    extract_inner(expr, table, renamer, should_replace_require, 0, 0)?;
  // The innermost frame's contribution is pushed first as the recursion
  // unwinds, so `prop_chain`/`call_chain` are already in source order —
  // no sort needed (sorting by the recorded depth would reverse them,
  // since the outermost link carries depth 0).
  Some(RequireExpr {
    path,
    prop_chain: prop_chain.into_iter().map(|(_, p)| p).collect(),
    call_chain: call_chain.into_iter().map(|(_, c)| c).collect(),
  })
}

type PendingProp = (usize, String);
type PendingCall = (usize, Vec<Expr>);

/// Recursive descent. `prop_depth`/`call_depth` count, from the require
/// call outward, how many property/call links have already been unwound
/// *below* this point in the recursion — i.e. they are source-order
/// indices assigned on the way back up, not on the way down. Each
/// successful frame returns the full, still-unordered sets of prop/call
/// entries collected below it, plus its own contribution appended.
fn extract_inner(
  expr: &Expr,
  table: &SymbolTable,
  renamer: &Renamer,
  should_replace_require: &dyn Fn(&str) -> bool,
  prop_depth: usize,
  call_depth: usize,
) -> Option<(String, Vec<PendingProp>, Vec<PendingCall>)> {
  match expr {
    Expr::Call(call) => {
      if let Expr::Ident(callee_sym) = call.callee.as_ref() {
        if renamer.name_for(table, *callee_sym) == "require"
          && renamer.is_unbound(table, *callee_sym)
          && call.args.len() == 1
          && !call.args[0].spread
        {
          if let Expr::Str(path) = call.args[0].expr.as_ref() {
            if should_replace_require(path) {
              return Some((path.clone(), Vec::new(), Vec::new()));
            }
          }
        }
        return None;
      }
      // Chained call on a require-rooted expression: recurse into the
      // callee one call-level deeper, then record this call's args at
      // that depth.
      let (path, prop_chain, mut call_chain) = extract_inner(
        call.callee.as_ref(),
        table,
        renamer,
        should_replace_require,
        prop_depth,
        call_depth + 1,
      )?;
      let args = call.args.iter().map(|a| (*a.expr).clone()).collect();
      call_chain.push((call_depth, args));
      Some((path, prop_chain, call_chain))
    }
    Expr::Member(member) => {
      if member.prop != MemberProp::Ident || member.computed_prop.is_some() {
        return None;
      }
      let (path, mut prop_chain, call_chain) = extract_inner(
        member.obj.as_ref(),
        table,
        renamer,
        should_replace_require,
        prop_depth + 1,
        call_depth,
      )?;
      prop_chain.push((prop_depth, member.prop_name.clone()));
      Some((path, prop_chain, call_chain))
    }
    _ => None,
  }
}

/// Reconstructs the textual form `require("p")(c1)...(ck).p1...pm` that the
/// printer emits for a [`RequireExpr`]'s *upstream require call only* — the
/// caller (statement rewriter) is responsible for wrapping this in the
/// host-contract call shape (§4.5's "Output shape of require/import
/// expressions").
impl RequireExpr {
  pub fn has_chains(&self) -> bool {
    !self.prop_chain.is_empty() || !self.call_chain.is_empty()
  }
}
