//! # jsv-cli — Command Line for the jsv Schema Engine
//!
//! Provides the `jsv` binary.
//!
//! ## Subcommands
//!
//! - `jsv keywords` — list registered keywords in evaluation order.
//! - `jsv classify` — tell registered, not-supported and unknown keyword
//!   names apart.
//! - `jsv validate` — validate JSON or YAML documents against a local
//!   schema, with optional extra schema documents for `$ref`.
//!
//! ```bash
//! jsv keywords --json
//! jsv classify type definitions x-vendor
//! jsv validate --schema person.schema.json --include common.json people/*.yaml
//! ```

pub mod classify;
pub mod keywords;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read a JSON or YAML document.
///
/// `.yaml` / `.yml` files are parsed as YAML; everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// The URI a schema document is registered under: its `$id` if it has
/// one, otherwise a `file://` URI of its canonical path.
pub fn schema_uri(path: &Path, raw: &Value) -> Result<String> {
    if let Some(id) = raw.get("$id").and_then(Value::as_str) {
        return Ok(id.trim_end_matches('#').to_string());
    }
    let canonical = std::fs::canonicalize(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    Ok(format!("file://{}", canonical.display()))
}
