//! # Validate Subcommand
//!
//! Validates JSON or YAML documents against a local schema document.
//!
//! Extra schema documents given with `--include` are compiled first into
//! the same store, so the main schema's `$ref`s can reach them by `$id`
//! (or by `file://` URI when they have none). Nothing is fetched over
//! the network.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use jsv_core::{KeyError, RunContext};
use jsv_schema::{
    copy_global_keyword_registry, CompileOptions, CompiledSchema, KeywordRegistry, SchemaRegistry,
};

use crate::{load_document, schema_uri};

/// Output format of the validate subcommand.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per document, errors indented below.
    #[default]
    Text,
    /// A JSON array of per-document reports.
    Json,
}

/// Arguments for the `jsv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document to validate against.
    #[arg(long, short = 's', value_name = "PATH")]
    pub schema: PathBuf,

    /// Additional schema documents `$ref` may point into.
    #[arg(long, value_name = "PATH")]
    pub include: Vec<PathBuf>,

    /// Fail on known-but-unsupported keywords instead of ignoring them.
    #[arg(long)]
    pub reject_unsupported: bool,

    /// Abort validation after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Documents to validate (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,
}

/// Validation outcome of one document.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    /// The document path as given.
    pub document: PathBuf,
    /// True if the check ran to completion and found no error.
    pub valid: bool,
    /// False if the deadline cut the check short.
    pub complete: bool,
    /// Every error found.
    pub errors: Vec<KeyError>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if every document is valid, 1 if any is invalid,
/// 2 if the deadline expired before every document was fully checked.
/// Unreadable files and schemas that do not compile are errors.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let registry = copy_global_keyword_registry();
    let options = CompileOptions {
        reject_unsupported: args.reject_unsupported,
    };
    let schema = compile_with_includes(&args.schema, &args.include, &registry, options)?;

    let ctx = match args.timeout_ms {
        Some(ms) => RunContext::background().with_timeout(Duration::from_millis(ms)),
        None => RunContext::background(),
    };

    let reports = validate_documents(&schema, &ctx, &args.documents)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&reports)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let failed = reports.iter().filter(|r| !r.valid).count();
    let incomplete = reports.iter().filter(|r| !r.complete).count();
    if incomplete > 0 {
        tracing::error!(
            incomplete,
            timeout_ms = ?args.timeout_ms,
            "validation deadline expired before every document was checked"
        );
        return Ok(2);
    }
    tracing::info!(documents = reports.len(), failed, "validation finished");
    Ok(if failed == 0 { 0 } else { 1 })
}

/// Compile `includes` and then `schema` into one store.
pub fn compile_with_includes(
    schema: &Path,
    includes: &[PathBuf],
    registry: &KeywordRegistry,
    options: CompileOptions,
) -> Result<CompiledSchema> {
    let mut store = SchemaRegistry::new();
    for path in includes {
        let raw = load_document(path)?;
        let uri = schema_uri(path, &raw)?;
        let compiled = CompiledSchema::compile_with(&raw, uri.as_str(), registry, options, store)
            .with_context(|| format!("failed to compile schema {}", path.display()))?;
        tracing::debug!(path = %path.display(), uri = %uri, "included schema");
        store = compiled.store().clone();
    }

    let raw = load_document(schema)?;
    let uri = schema_uri(schema, &raw)?;
    CompiledSchema::compile_with(&raw, uri, registry, options, store)
        .with_context(|| format!("failed to compile schema {}", schema.display()))
}

/// Validate each document, in order.
///
/// A document is complete only if `ctx` was still live once its check
/// finished; an incomplete document is never valid.
pub fn validate_documents(
    schema: &CompiledSchema,
    ctx: &RunContext,
    documents: &[PathBuf],
) -> Result<Vec<DocumentReport>> {
    documents
        .iter()
        .map(|path| {
            let data = load_document(path)?;
            let errors = schema.validate(ctx, &data);
            let complete = !ctx.is_done();
            Ok(DocumentReport {
                document: path.clone(),
                valid: complete && errors.is_empty(),
                complete,
                errors,
            })
        })
        .collect()
}

/// Human-readable report.
pub fn render_text(reports: &[DocumentReport]) -> String {
    let mut out = String::new();
    for report in reports {
        if report.valid {
            out.push_str(&format!("{}: OK\n", report.document.display()));
            continue;
        }
        if report.complete {
            out.push_str(&format!(
                "{}: {} error(s)\n",
                report.document.display(),
                report.errors.len()
            ));
        } else {
            out.push_str(&format!(
                "{}: TIMEOUT, {} error(s) before the deadline\n",
                report.document.display(),
                report.errors.len()
            ));
        }
        for error in &report.errors {
            out.push_str(&format!("  {error}\n"));
        }
    }
    out
}
