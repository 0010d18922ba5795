// Copyright 2018-2026 the Deno authors. MIT license.

//! §7 Error handling design.
//!
//! Only the third error class (malformed AST / impossible state) is
//! represented as a `Result` error here: snapshot-unsafe constructs and
//! rewrite-validation warnings are not failures, they are
//! [`crate::validator::ValidationError`] diagnostics returned alongside a
//! successful [`crate::driver::RewriteOutput`].

use thiserror::Error;

/// Fatal, programmer-error-class failures: the driver returns these instead
/// of panicking, so an embedding process running many modules in parallel
/// can log and skip one module instead of crashing the whole build.
#[derive(Debug, Error)]
pub enum RewriteError {
  #[error("invariant violated: {message} (at {location})")]
  Invariant { location: String, message: String },

  #[error("re-parse of rewritten output failed: {0}")]
  VerifyFailed(String),
}

/// Failures specific to extracting a shape from an expression subtree; kept
/// separate from [`RewriteError`] since extractors return `Option`, not
/// `Result`, in the common case — this only surfaces when a caller asks an
/// extractor to explain *why* it returned `None`.
#[derive(Debug, Error)]
pub enum ExtractError {
  #[error("expected an identifier pattern or flat object pattern, found an unsupported shape")]
  UnsupportedPatternShape,

  #[error("computed member access breaks the require chain")]
  ComputedMemberAccess,
}

/// How the driver's "verify print" pass (§7) handles a caller-supplied
/// `reparse` hook that re-parses the rewritten output under the external
/// grammar. Parsing itself is out of scope for this crate (§1), so the pass
/// is a no-op whenever the caller doesn't supply a `reparse` hook,
/// regardless of this mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifyMode {
  /// Don't invoke the `reparse` hook at all. Default, since re-parsing is
  /// out of scope for this crate's own responsibilities.
  #[default]
  Skip,
  /// Invoke `reparse`; panic if it reports a parse failure.
  Panic,
  /// Invoke `reparse`; on failure, record the message on
  /// [`crate::driver::RewriteOutput::verify_error`] and return normally.
  Collect,
}
