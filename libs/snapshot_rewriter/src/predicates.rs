// Copyright 2018-2026 the Deno authors. MIT license.

//! §6 "Module-graph norewrite list semantics" — the one piece of predicate
//! plumbing common enough across callers that it's worth shipping here
//! rather than letting every caller reimplement the suffix-vs-exact
//! distinction.

/// Matches a single `norewrite` list entry against a normalized module
/// path. Callers are expected to have already normalized slashes and
/// trimmed a leading `./` from `normalized_path` before calling this.
///
/// - An entry beginning with `*/` matches any path ending with the suffix
///   after the `*/`.
/// - Any other entry matches only by exact string equality.
pub fn norewrite_matches(entry: &str, normalized_path: &str) -> bool {
  match entry.strip_prefix("*/") {
    Some(suffix) => normalized_path.ends_with(suffix),
    None => entry == normalized_path,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_entry_matches_only_exact_path() {
    assert!(norewrite_matches("lib/polyfill.js", "lib/polyfill.js"));
    assert!(!norewrite_matches("lib/polyfill.js", "src/lib/polyfill.js"));
  }

  #[test]
  fn suffix_entry_matches_any_prefix() {
    assert!(norewrite_matches("*/polyfill.js", "lib/polyfill.js"));
    assert!(norewrite_matches("*/polyfill.js", "vendor/lib/polyfill.js"));
    assert!(norewrite_matches("*/polyfill.js", "polyfill.js"));
  }

  #[test]
  fn suffix_entry_rejects_non_matching_path() {
    assert!(!norewrite_matches("*/polyfill.js", "lib/other.js"));
  }
}
