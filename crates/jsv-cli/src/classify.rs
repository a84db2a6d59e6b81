//! # Classify Subcommand
//!
//! Reports how the registry treats each given keyword name: registered,
//! recognised but not supported, or unknown (compiled to a no-op).

use std::fmt;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use jsv_schema::{copy_global_keyword_registry, KeywordRegistry};

/// Arguments for the `jsv classify` subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Keyword names to classify.
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// How a keyword name is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// A factory is registered.
    Registered,
    /// Recognised, but ignored (or rejected) when compiling.
    NotSupported,
    /// Not known at all; compiles to a no-op.
    Unknown,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registered => "registered",
            Self::NotSupported => "not-supported",
            Self::Unknown => "unknown",
        })
    }
}

/// Classify `name` against `registry`.
///
/// A registered factory wins over the not-supported table.
pub fn classify(registry: &KeywordRegistry, name: &str) -> Classification {
    if registry.is_registered_keyword(name) {
        Classification::Registered
    } else if registry.is_not_supported_keyword(name) {
        Classification::NotSupported
    } else {
        Classification::Unknown
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    classification: Classification,
}

/// Execute the classify subcommand.
///
/// Returns exit code: 0 if every name is registered, 1 otherwise.
pub fn run_classify(args: &ClassifyArgs) -> Result<u8> {
    let registry = copy_global_keyword_registry();
    let entries: Vec<Entry<'_>> = args
        .names
        .iter()
        .map(|name| Entry {
            name,
            classification: classify(&registry, name),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{}: {}", entry.name, entry.classification);
        }
    }

    let all_registered = entries
        .iter()
        .all(|e| e.classification == Classification::Registered);
    Ok(if all_registered { 0 } else { 1 })
}
