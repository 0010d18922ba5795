// Copyright 2018-2026 the Deno authors. MIT license.

//! §4.10 Driver — the crate's public entry point. Ties the statement
//! rewriter, validator (run inline by the printer), CJS shape analyzer, and
//! printer together into a single [`RewriteOutput`] per module.
//!
//! Per §5, a driver call owns every per-module accumulator and is otherwise
//! stateless with respect to other concurrent calls: the embedding bundler
//! is expected to invoke [`rewrite_module`] once per module, in parallel
//! across modules, with no shared mutable state between calls.

use crate::cjs::analyze_cjs_exports;
use crate::cjs::CjsExportInfo;
use crate::error::RewriteError;
use crate::error::VerifyMode;
use crate::prelude::inject_prelude;
use crate::prelude::TopLevelVars;
use crate::printer::print_module;
use crate::printer::OriginalPosResolver;
use crate::printer::PrinterOptions;
use crate::printer::SourceMapChunk;
use crate::renamer::Renamer;
use crate::rewriter::rewrite_module as rewrite_statements;
use crate::rewriter::RewriteContext;
use crate::stats::RewriteStats;
use crate::symbol::SymbolTable;
use crate::validator::ValidationError;
use crate::validator::ValidationMode;
use crate::ast::Module;

/// Everything the driver hands back for one module.
pub struct RewriteOutput {
  pub code: Vec<u8>,
  pub source_map: SourceMapChunk,
  pub diagnostics: Vec<ValidationError>,
  pub cjs_info: CjsExportInfo,
  pub stats: RewriteStats,
  /// Set when `request.verify == VerifyMode::Collect` and the caller's
  /// `reparse` hook reported the rewritten output doesn't parse. `None` in
  /// every other case, including when `verify == Panic` (that mode never
  /// returns on failure at all) and when `verify == Skip` or no `reparse`
  /// hook was supplied (the pass never runs).
  pub verify_error: Option<String>,
}

/// Bundles the two rewrite-predicate and one mode input the driver needs
/// from its caller, per §6's "Rewrite-predicate contract" — grouped into one
/// struct so call sites don't thread four separate closures/flags through
/// every invocation.
pub struct RewriteRequest<'a> {
  pub module_path: &'a str,
  pub is_wrapped: bool,
  pub should_replace_require: &'a dyn Fn(&str) -> bool,
  pub should_rewrite_module: &'a dyn Fn(&str) -> bool,
  pub printer_options: PrinterOptions,
  pub validation_mode: ValidationMode,
  /// §7: how to react to a failed `reparse` call. Irrelevant when `reparse`
  /// is `None`.
  pub verify: VerifyMode,
  /// An optional hook the caller supplies to re-parse the rewritten output
  /// under whatever external grammar produced `module` in the first place.
  /// This crate has no parser of its own (§1 Non-goals), so the actual
  /// parsing is always the caller's responsibility; this hook just lets the
  /// driver ask for it without depending on any particular parser crate.
  pub reparse: Option<&'a dyn Fn(&[u8]) -> Result<(), String>>,
}

/// Rewrites `module` per `request`, returning the full [`RewriteOutput`].
/// `resolve_original` lets the caller attach real source-map positions to
/// the printer's output; pass `None` when no upstream source map is
/// available (the resulting chunk's `should_ignore` will be `true`).
///
/// Fails only per §7's third error class: a malformed-AST/impossible-state
/// invariant violation, or (when `request.verify == VerifyMode::Panic`) this
/// function panics instead of returning `Err` — panicking is the explicit
/// contract of that mode, not an oversight.
pub fn rewrite_module(
  module: &Module,
  table: &SymbolTable,
  request: &RewriteRequest,
  resolve_original: Option<&OriginalPosResolver<'_>>,
) -> Result<RewriteOutput, RewriteError> {
  log::debug!(
    "snapshot_rewriter: entering rewrite_module for {}",
    request.module_path
  );

  let cjs_info = analyze_cjs_exports(module, table);

  let mut renamer = Renamer::new();
  let mut top_level_vars = TopLevelVars::new();
  let mut stats = RewriteStats::new();
  let rewriting_enabled = (request.should_rewrite_module)(request.module_path);

  let rewritten = {
    let mut ctx = RewriteContext {
      table,
      renamer: &mut renamer,
      top_level_vars: &mut top_level_vars,
      stats: &mut stats,
      should_replace_require: request.should_replace_require,
      rewriting_enabled,
    };
    rewrite_statements(module, &mut ctx, request.is_wrapped)
  };

  let (body, mut chunk, mut diagnostics) = print_module(
    &rewritten,
    table,
    &renamer,
    request.printer_options,
    request.validation_mode,
    resolve_original,
  );

  for diagnostic in &diagnostics {
    match diagnostic.kind {
      crate::validator::ValidationKind::Defer => stats.defer_diagnostics += 1,
      crate::validator::ValidationKind::NoRewrite => stats.norewrite_diagnostics += 1,
    }
    log::warn!(
      "snapshot_rewriter: {} in {} at offset {}: {}",
      diagnostic_kind_label(diagnostic.kind),
      request.module_path,
      diagnostic.offset,
      diagnostic.message
    );
  }

  let full_code = if top_level_vars.is_empty() {
    body
  } else {
    let prelude_lines = crate::prelude::prelude_line_count(&top_level_vars);
    rebase_chunk_for_prelude(&mut chunk, prelude_lines);
    inject_prelude(&body, &top_level_vars)
  };

  // `stats.accessors_created`/`global_rewrites`/`path_resolver_rewrites` are
  // recorded by the statement rewriter itself via `ctx.stats`; nothing left
  // to add here beyond the diagnostic counts above.
  diagnostics.sort_by_key(|d| d.offset);

  log::debug!(
    "snapshot_rewriter: leaving rewrite_module for {} ({} accessors created, {} diagnostics)",
    request.module_path,
    stats.accessors_created,
    diagnostics.len()
  );

  let code = full_code.into_bytes();
  let verify_error = run_verify_pass(request, &code)?;

  Ok(RewriteOutput {
    code,
    source_map: chunk,
    diagnostics,
    cjs_info,
    stats,
    verify_error,
  })
}

/// Runs the §7 "verify print" pass: invokes `request.reparse` on the final
/// rewritten bytes, if both a hook and a non-`Skip` mode were supplied, and
/// handles the result per `request.verify`.
fn run_verify_pass(request: &RewriteRequest, code: &[u8]) -> Result<Option<String>, RewriteError> {
  let Some(reparse) = request.reparse else {
    return Ok(None);
  };
  if request.verify == VerifyMode::Skip {
    return Ok(None);
  }
  match reparse(code) {
    Ok(()) => Ok(None),
    Err(message) => {
      let err = RewriteError::VerifyFailed(message);
      match request.verify {
        VerifyMode::Skip => Ok(None),
        VerifyMode::Panic => {
          panic!("snapshot_rewriter: {} ({})", err, request.module_path)
        }
        VerifyMode::Collect => {
          log::warn!("snapshot_rewriter: {} ({})", err, request.module_path);
          Ok(Some(err.to_string()))
        }
      }
    }
  }
}

fn diagnostic_kind_label(kind: crate::validator::ValidationKind) -> &'static str {
  match kind {
    crate::validator::ValidationKind::Defer => "defer",
    crate::validator::ValidationKind::NoRewrite => "no-rewrite",
  }
}

/// A one-line prepend only ever shifts the mapping state attributed to the
/// *first* generated line (see `prelude.rs`'s doc comment and Design Note
/// "AST-cursor ownership"); every mapping after the first `;` is relative
/// and needs no adjustment. Prepending `prelude_lines` newlines means the
/// VLQ stream needs that many extra leading `;` separators so generated
/// line numbers stay aligned with the shifted body.
fn rebase_chunk_for_prelude(chunk: &mut SourceMapChunk, prelude_lines: u32) {
  if prelude_lines == 0 {
    return;
  }
  let mut prefix = String::with_capacity(prelude_lines as usize);
  for _ in 0..prelude_lines {
    prefix.push(';');
  }
  chunk.mappings = format!("{prefix}{}", chunk.mappings);
  chunk.final_generated_line += prelude_lines;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::AssignExpr;
  use crate::ast::AssignOp;
  use crate::ast::CallExpr;
  use crate::ast::Expr;
  use crate::ast::ExprOrSpread;
  use crate::ast::Stmt;
  use crate::symbol::SymbolKind;

  fn always_true(_: &str) -> bool {
    true
  }

  /// §8 scenario: `const dbg = require('debug')('app');` at module scope
  /// becomes a deferred accessor, and the output is re-parseable (verified
  /// here only as "well-formed ASCII text containing the accessor name",
  /// since this crate has no parser of its own to re-parse with).
  #[test]
  fn bare_require_becomes_accessor_through_full_driver() {
    let mut table = SymbolTable::new();
    let dbg = table.declare("dbg", SymbolKind::DeclaredInScope);
    let require_sym = table.declare("require", SymbolKind::Unbound);
    let require_call = Expr::Call(Box::new(CallExpr {
      callee: Box::new(Expr::Ident(require_sym)),
      args: vec![ExprOrSpread {
        spread: false,
        expr: Box::new(Expr::Str("debug".into())),
      }],
      optional: false,
    }));
    let module = Module {
      body: vec![Stmt::VarDecl(crate::ast::VarDecl {
        span: crate::ast::dummy_span(),
        kind: crate::ast::VarDeclKind::Const,
        decls: vec![crate::ast::VarDeclarator {
          span: crate::ast::dummy_span(),
          name: crate::ast::Pat::Ident(dbg),
          init: Some(require_call),
        }],
      })],
    };
    let request = RewriteRequest {
      module_path: "app.js",
      is_wrapped: false,
      should_replace_require: &always_true,
      should_rewrite_module: &always_true,
      printer_options: PrinterOptions::default(),
      validation_mode: ValidationMode::Lenient,
      verify: VerifyMode::Skip,
      reparse: None,
    };
    let output = rewrite_module(&module, &table, &request, None).unwrap();
    let code = String::from_utf8(output.code).unwrap();
    assert!(code.contains("__get_dbg__"));
    assert!(output.stats.accessors_created >= 1);
    assert!(output.verify_error.is_none());
  }

  /// `should_rewrite_module` returning false suppresses accessor creation
  /// but the require-call host contract still applies.
  #[test]
  fn disabled_module_still_gets_require_contract_shape() {
    let mut table = SymbolTable::new();
    let console = table.declare("console", SymbolKind::Unbound);
    let log_member = Expr::Member(Box::new(crate::ast::MemberExpr {
      obj: Box::new(Expr::Ident(console)),
      prop_name: "log".into(),
      computed_prop: None,
      prop: crate::ast::MemberProp::Ident,
      optional: false,
    }));
    let call = Expr::Call(Box::new(CallExpr {
      callee: Box::new(log_member),
      args: vec![],
      optional: false,
    }));
    let module = Module {
      body: vec![Stmt::Expr(call)],
    };
    let request = RewriteRequest {
      module_path: "vendor/polyfill.js",
      is_wrapped: false,
      should_replace_require: &always_true,
      should_rewrite_module: &|_| false,
      printer_options: PrinterOptions::default(),
      validation_mode: ValidationMode::Lenient,
      verify: VerifyMode::Skip,
      reparse: None,
    };
    let output = rewrite_module(&module, &table, &request, None).unwrap();
    let code = String::from_utf8(output.code).unwrap();
    assert!(code.contains("get_console()"));
  }

  #[test]
  fn module_exports_assignment_is_reflected_in_cjs_info() {
    let mut table = SymbolTable::new();
    let module_sym = table.declare("module", SymbolKind::Unbound);
    let exports_member = Expr::Member(Box::new(crate::ast::MemberExpr {
      obj: Box::new(Expr::Ident(module_sym)),
      prop_name: "exports".into(),
      computed_prop: None,
      prop: crate::ast::MemberProp::Ident,
      optional: false,
    }));
    let assign = Expr::Assign(Box::new(AssignExpr {
      op: AssignOp::Assign,
      target: Box::new(exports_member),
      value: Box::new(Expr::Object(vec![])),
    }));
    let module = Module {
      body: vec![Stmt::Expr(assign)],
    };
    let request = RewriteRequest {
      module_path: "index.js",
      is_wrapped: false,
      should_replace_require: &always_true,
      should_rewrite_module: &always_true,
      printer_options: PrinterOptions::default(),
      validation_mode: ValidationMode::Lenient,
      verify: VerifyMode::Skip,
      reparse: None,
    };
    let output = rewrite_module(&module, &table, &request, None).unwrap();
    assert!(output.cjs_info.has_module_exports_assignment);
  }

  /// `VerifyMode::Collect` surfaces a failing `reparse` hook's message
  /// without failing the call.
  #[test]
  fn collect_verify_mode_surfaces_reparse_failure_without_erroring() {
    let table = SymbolTable::new();
    let module = Module { body: vec![] };
    let fails_reparse = |_: &[u8]| Err("unexpected token".to_string());
    let request = RewriteRequest {
      module_path: "broken.js",
      is_wrapped: false,
      should_replace_require: &always_true,
      should_rewrite_module: &always_true,
      printer_options: PrinterOptions::default(),
      validation_mode: ValidationMode::Lenient,
      verify: VerifyMode::Collect,
      reparse: Some(&fails_reparse),
    };
    let output = rewrite_module(&module, &table, &request, None).unwrap();
    assert_eq!(output.verify_error.as_deref(), Some("re-parse of rewritten output failed: unexpected token"));
  }

  /// `VerifyMode::Skip` never invokes `reparse`, even when one is supplied.
  #[test]
  fn skip_verify_mode_never_invokes_reparse() {
    let table = SymbolTable::new();
    let module = Module { body: vec![] };
    let fails_reparse = |_: &[u8]| -> Result<(), String> { panic!("reparse should not be called") };
    let request = RewriteRequest {
      module_path: "fine.js",
      is_wrapped: false,
      should_replace_require: &always_true,
      should_rewrite_module: &always_true,
      printer_options: PrinterOptions::default(),
      validation_mode: ValidationMode::Lenient,
      verify: VerifyMode::Skip,
      reparse: Some(&fails_reparse),
    };
    let output = rewrite_module(&module, &table, &request, None).unwrap();
    assert!(output.verify_error.is_none());
  }
}
