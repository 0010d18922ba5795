// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.1 Renamer — maps symbol identities to emitted names and records
//! per-symbol deferred-accessor substitutions.

use crate::symbol::SymbolId;
use crate::symbol::SymbolMap;
use crate::symbol::SymbolTable;

/// A recorded substitution: whenever this symbol is printed in a
/// reference position, print `replacement` instead of the symbol's
/// original name.
#[derive(Debug, Clone)]
struct Replacement {
  replacement: String,
}

#[derive(Debug, Default)]
pub struct Renamer {
  replacements: SymbolMap<Replacement>,
}

impl Renamer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the text that should be printed for a *reference* to `sym`:
  /// the recorded replacement if one exists, else the symbol's original
  /// name.
  pub fn name_for(&self, table: &SymbolTable, sym: SymbolId) -> String {
    let canonical = table.canonical(sym);
    match self.replacements.get(canonical) {
      Some(r) => r.replacement.clone(),
      None => table.original_name(sym).to_string(),
    }
  }

  /// Records that references to `sym` should be printed as `text` from now
  /// on (e.g. `__get_foo__()`).
  pub fn replace(&mut self, table: &SymbolTable, sym: SymbolId, text: impl Into<String>) {
    let canonical = table.canonical(sym);
    self.replacements.insert(
      canonical,
      Replacement {
        replacement: text.into(),
      },
    );
  }

  pub fn has_been_replaced(&self, table: &SymbolTable, sym: SymbolId) -> bool {
    self.replacements.contains(table.canonical(sym))
  }

  pub fn is_unbound(&self, table: &SymbolTable, sym: SymbolId) -> bool {
    table.is_unbound(sym)
  }

  pub fn is_unwrappable(&self, table: &SymbolTable, sym: SymbolId) -> bool {
    table.is_unwrappable(sym)
  }

  /// Returns the symbol's original name regardless of any recorded
  /// replacement. Used only in *binding* positions (declarator LHS,
  /// function/class name slots) — see Design Note 1: applied
  /// conservatively to every such position, not just the ones known to
  /// need it.
  pub fn name_for_binding_position(&self, table: &SymbolTable, sym: SymbolId) -> String {
    table.original_name(sym).to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::symbol::SymbolKind;

  #[test]
  fn unreplaced_symbol_prints_original_name() {
    let mut table = SymbolTable::new();
    let foo = table.declare("foo", SymbolKind::DeclaredInScope);
    let renamer = Renamer::new();
    assert_eq!(renamer.name_for(&table, foo), "foo");
    assert!(!renamer.has_been_replaced(&table, foo));
  }

  #[test]
  fn replaced_symbol_prints_accessor_call() {
    let mut table = SymbolTable::new();
    let foo = table.declare("foo", SymbolKind::DeclaredInScope);
    let mut renamer = Renamer::new();
    renamer.replace(&table, foo, "__get_foo__()");
    assert_eq!(renamer.name_for(&table, foo), "__get_foo__()");
    assert!(renamer.has_been_replaced(&table, foo));
    // Binding position is unaffected by the replacement.
    assert_eq!(renamer.name_for_binding_position(&table, foo), "foo");
  }

  #[test]
  fn replacement_follows_link_chain() {
    let mut table = SymbolTable::new();
    let a = table.declare("a", SymbolKind::DeclaredInScope);
    let b = table.declare("b", SymbolKind::DeclaredInScope);
    table.link(b, a);
    let mut renamer = Renamer::new();
    renamer.replace(&table, a, "__get_a__()");
    assert_eq!(renamer.name_for(&table, b), "__get_a__()");
  }
}
