// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.3 Binding extractor.

use crate::ast::Pat;
use crate::symbol::SymbolId;

/// One binding produced by destructuring (or directly naming) the result
/// of a [`crate::require_expr::RequireExpr`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequireBinding {
  pub symbol: SymbolId,
  /// `Some(key)` for `const {key: symbol} = ...` / `const {key} = ...`;
  /// `None` for a plain identifier binding.
  pub destructured_key: Option<String>,
}

impl RequireBinding {
  pub fn is_destructured(&self) -> bool {
    self.destructured_key.is_some()
  }
}

/// Extracts bindings from an LHS pattern. Returns `None` if the pattern has
/// a shape this extractor doesn't flatten (nested object patterns, rest
/// elements, computed keys, array patterns) — those are left to the
/// validator rather than guessed at here.
pub fn extract_bindings(pat: &Pat) -> Option<Vec<RequireBinding>> {
  match pat {
    Pat::Ident(sym) => Some(vec![RequireBinding {
      symbol: *sym,
      destructured_key: None,
    }]),
    Pat::Object {
      props,
      has_unsupported_shape,
    } => {
      if *has_unsupported_shape {
        return None;
      }
      let mut bindings = Vec::with_capacity(props.len());
      for prop in props {
        match &prop.value {
          Pat::Ident(sym) => bindings.push(RequireBinding {
            symbol: *sym,
            destructured_key: Some(prop.key.clone()),
          }),
          // A property's value must be an identifier (§4.3); anything
          // else means this object pattern doesn't flatten cleanly.
          _ => return None,
        }
      }
      Some(bindings)
    }
    Pat::Opaque(_) => None,
  }
}
