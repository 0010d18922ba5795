// Copyright 2018-2026 the Deno authors. MIT license.

//! The symbol table handed to the driver by the embedding bundler. The core
//! never creates symbols itself (see the input contract in SPEC_FULL.md
//! §6) — it only follows link chains and queries kinds.

use std::collections::HashMap;

/// Stable identity of a binding, as assigned by the external resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// What a symbol denotes, as determined by the external resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
  /// Declared by a `const`/`let`/`var`/function/class/parameter binding
  /// somewhere in the module.
  DeclaredInScope,
  /// Free: no declaration anywhere in the enclosing scope chain resolves
  /// it. `process`, `console`, `__dirname` read as a bare identifier with
  /// no local declaration are unbound.
  Unbound,
  /// Bound by an `import` specifier.
  ImportBinding,
  /// Bound by an `import * as ns` namespace specifier.
  NamespaceAlias,
}

#[derive(Debug, Clone)]
struct SymbolData {
  original_name: String,
  kind: SymbolKind,
  /// If set, queries against this symbol should be answered by following
  /// the chain to `link` instead (e.g. a `var` hoisted alias pointing back
  /// at the canonical declaration).
  link: Option<SymbolId>,
}

/// A read-only table of symbols, indexed by [`SymbolId`].
///
/// This is deliberately *not* a general-purpose scope/resolver data
/// structure: it only exposes what the rewriter needs (original name, kind,
/// and canonicalization through links), per the input contract.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
  symbols: Vec<SymbolData>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a new symbol and returns its id. Used by callers building a
  /// table (typically the bundler, or tests in this crate); the driver
  /// itself only reads through [`SymbolTable`].
  pub fn declare(&mut self, original_name: impl Into<String>, kind: SymbolKind) -> SymbolId {
    let id = SymbolId(self.symbols.len() as u32);
    self.symbols.push(SymbolData {
      original_name: original_name.into(),
      kind,
      link: None,
    });
    id
  }

  /// Links `from` to `to`: all queries against `from` are resolved against
  /// `to`'s canonical symbol instead.
  pub fn link(&mut self, from: SymbolId, to: SymbolId) {
    self.symbols[from.0 as usize].link = Some(to);
  }

  /// Follows the link chain starting at `id` until it reaches a symbol with
  /// no link, returning that terminal id.
  pub fn canonical(&self, id: SymbolId) -> SymbolId {
    let mut current = id;
    // A malformed table could in principle contain a cycle; bound the walk
    // so a bad input can't hang the driver.
    for _ in 0..self.symbols.len() + 1 {
      match self.symbols[current.0 as usize].link {
        Some(next) if next != current => current = next,
        _ => return current,
      }
    }
    current
  }

  pub fn original_name(&self, id: SymbolId) -> &str {
    let canonical = self.canonical(id);
    &self.symbols[canonical.0 as usize].original_name
  }

  pub fn kind(&self, id: SymbolId) -> SymbolKind {
    let canonical = self.canonical(id);
    self.symbols[canonical.0 as usize].kind
  }

  pub fn is_unbound(&self, id: SymbolId) -> bool {
    self.kind(id) == SymbolKind::Unbound
  }

  /// True iff the symbol can be rewritten in place without threading a
  /// declaration through — unbound globals and import bindings never need a
  /// `let`/accessor scaffold of their own (they're already "lazy": an
  /// unbound global is read fresh every time, and an import binding is the
  /// bundler's own indirection).
  pub fn is_unwrappable(&self, id: SymbolId) -> bool {
    matches!(
      self.kind(id),
      SymbolKind::Unbound | SymbolKind::ImportBinding
    )
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }
}

/// A lookup table keyed by canonical [`SymbolId`], used by the renamer and
/// by `TopLevelVars` tracking. Separate from [`SymbolTable`] because those
/// two pieces of state have different lifetimes: the symbol table is
/// read-only input, this map is rewrite-phase output.
#[derive(Debug, Clone, Default)]
pub struct SymbolMap<V> {
  inner: HashMap<SymbolId, V>,
}

impl<V> SymbolMap<V> {
  pub fn new() -> Self {
    Self {
      inner: HashMap::new(),
    }
  }

  pub fn get(&self, id: SymbolId) -> Option<&V> {
    self.inner.get(&id)
  }

  pub fn insert(&mut self, id: SymbolId, value: V) -> Option<V> {
    self.inner.insert(id, value)
  }

  pub fn contains(&self, id: SymbolId) -> bool {
    self.inner.contains_key(&id)
  }
}
