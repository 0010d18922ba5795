// Copyright 2018-2026 the Deno authors. MIT license.

//! §3 `RewriteStats` — compact per-module counters accumulated during a
//! single driver invocation.

/// Counters accumulated during one [`crate::driver::rewrite_module`] call.
/// Monotonic within that call; never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
  pub accessors_created: usize,
  pub global_rewrites: usize,
  pub path_resolver_rewrites: usize,
  pub defer_diagnostics: usize,
  pub norewrite_diagnostics: usize,
}

impl RewriteStats {
  pub fn new() -> Self {
    Self::default()
  }
}
