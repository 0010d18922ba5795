// Copyright 2018-2026 the Deno authors. MIT license.

//! Rewrites CommonJS/bundled-JS modules so module-scope side effects are
//! deferred behind lazy accessors, letting a V8 heap snapshot capture a
//! module graph's *declarations* without running its *initialization* code.
//!
//! This crate is a pure, synchronous, single-pass compute library: it
//! consumes an already-parsed, symbol-resolved AST (see [`ast`] and
//! [`symbol`]) and produces rewritten source text plus a source map. It
//! never parses, never does file I/O, and never makes scope-resolution
//! decisions of its own — see [`driver`]'s module docs for the full input
//! contract.
//!
//! Start at [`driver::rewrite_module`].

pub mod ast;
pub mod binding;
pub mod cjs;
pub mod error;
pub mod globals;
pub mod predicates;
pub mod prelude;
pub mod printer;
pub mod renamer;
pub mod require_expr;
pub mod rewriter;
pub mod stats;
pub mod symbol;
pub mod validator;

pub mod driver;

pub use cjs::analyze_cjs_exports;
pub use cjs::CjsExportInfo;
pub use driver::rewrite_module;
pub use driver::RewriteOutput;
pub use driver::RewriteRequest;
pub use error::ExtractError;
pub use error::RewriteError;
pub use error::VerifyMode;
pub use predicates::norewrite_matches;
pub use printer::PrinterOptions;
pub use printer::SourceMapChunk;
pub use stats::RewriteStats;
pub use validator::ValidationError;
pub use validator::ValidationKind;
pub use validator::ValidationMode;
