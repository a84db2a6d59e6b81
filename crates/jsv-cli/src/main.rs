//! # jsv CLI entry point
//!
//! Parses command-line arguments, configures logging and error rendering,
//! and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jsv_cli::classify::{run_classify, ClassifyArgs};
use jsv_cli::keywords::{run_keywords, KeywordsArgs};
use jsv_cli::validate::{run_validate, ValidateArgs};
use jsv_core::RenderConfig;

/// jsv: JSON Schema keyword registry and validator.
///
/// Inspect the keyword registry, classify keyword names, and validate
/// JSON or YAML documents against local schemas.
#[derive(Parser, Debug)]
#[command(name = "jsv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum characters of an invalid value shown in an error; -1 shows
    /// values in full. Overrides JSV_MAX_ERR_VALUE_LEN.
    #[arg(
        long,
        global = true,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64).range(-1..)
    )]
    max_value_len: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered keywords in evaluation order.
    Keywords(KeywordsArgs),

    /// Classify keyword names as registered, not supported, or unknown.
    Classify(ClassifyArgs),

    /// Validate documents against a schema.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "jsv starting");

    let mut config = match RenderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(2);
        }
    };
    if let Some(len) = cli.max_value_len {
        config.max_err_value_len = len;
    }
    config.apply();

    let result = match cli.command {
        Commands::Keywords(args) => run_keywords(&args),
        Commands::Classify(args) => run_classify(&args),
        Commands::Validate(args) => run_validate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_limit_and_verbosity() {
        let cli = Cli::try_parse_from(["jsv", "-vv", "--max-value-len", "-1", "keywords"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.max_value_len, Some(-1));
        assert!(matches!(cli.command, Commands::Keywords(_)));
    }

    #[test]
    fn rejects_limits_below_minus_one() {
        assert!(Cli::try_parse_from(["jsv", "--max-value-len", "-2", "keywords"]).is_err());
    }

    #[test]
    fn validate_requires_schema_and_documents() {
        assert!(Cli::try_parse_from(["jsv", "validate", "doc.json"]).is_err());
        assert!(Cli::try_parse_from(["jsv", "validate", "--schema", "s.json"]).is_err());
        let cli = Cli::try_parse_from([
            "jsv", "validate", "-s", "s.json", "--include", "c.json", "--format", "json", "a.json",
            "b.yaml",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.documents.len(), 2);
                assert_eq!(args.include.len(), 1);
            }
            other => panic!("expected validate, got {other:?}"),
        }
    }

    #[test]
    fn classify_requires_a_name() {
        assert!(Cli::try_parse_from(["jsv", "classify"]).is_err());
    }
}
