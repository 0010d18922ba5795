// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.8 Top-level prelude injector.

/// An insertion-ordered, duplicate-free list of accessor names that need a
/// single `let name1, name2, …;` declaration at the very top of the
/// module's output — the "late-assignment" form (§4.5's assignment-
/// statement case), where the accessor is assigned to rather than declared.
#[derive(Debug, Clone, Default)]
pub struct TopLevelVars {
  names: Vec<String>,
}

impl TopLevelVars {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records `name`, if not already present. Returns `true` if this call
  /// added a new entry.
  pub fn track(&mut self, name: impl Into<String>) -> bool {
    let name = name.into();
    if self.names.iter().any(|n| *n == name) {
      return false;
    }
    self.names.push(name);
    true
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  /// Renders the `let <name1>, <name2>, …;` prelude line, or `None` if
  /// there is nothing to declare.
  pub fn render(&self) -> Option<String> {
    if self.names.is_empty() {
      return None;
    }
    Some(format!("let {};\n", self.names.join(", ")))
  }
}

/// Byte-level prepend of the rendered prelude to an already-printed module
/// body. A one-line prepend only ever shifts the *first* generated line's
/// mapping base (Design Note "AST-cursor ownership"); everything after the
/// first newline in `source_map_prefix_lines` is unaffected, since source
/// maps encode line boundaries with `;` separators that are relative to
/// the previous line, not absolute.
pub fn inject_prelude(body: &str, vars: &TopLevelVars) -> String {
  match vars.render() {
    Some(prelude) => format!("{prelude}{body}"),
    None => body.to_string(),
  }
}

/// How many newlines the rendered prelude itself occupies — the printer
/// uses this to rebase the first generated line of its own source-map
/// mappings after the prepend.
pub fn prelude_line_count(vars: &TopLevelVars) -> u32 {
  match vars.render() {
    Some(prelude) => prelude.matches('\n').count() as u32,
    None => 0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_renders_nothing() {
    let vars = TopLevelVars::new();
    assert!(vars.render().is_none());
    assert_eq!(prelude_line_count(&vars), 0);
  }

  #[test]
  fn tracks_are_deduplicated_and_ordered() {
    let mut vars = TopLevelVars::new();
    assert!(vars.track("__get_a__"));
    assert!(vars.track("__get_b__"));
    assert!(!vars.track("__get_a__"));
    assert_eq!(vars.render().unwrap(), "let __get_a__, __get_b__;\n");
    assert_eq!(prelude_line_count(&vars), 1);
  }

  #[test]
  fn inject_prepends_body() {
    let mut vars = TopLevelVars::new();
    vars.track("__get_a__");
    let out = inject_prelude("console.log(1);\n", &vars);
    assert_eq!(out, "let __get_a__;\nconsole.log(1);\n");
  }
}
