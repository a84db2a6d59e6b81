//! # Keywords Subcommand
//!
//! Lists the keywords of the process-wide registry in evaluation order,
//! with their priority and insertion rank.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use jsv_schema::{copy_global_keyword_registry, KeywordRegistry, NOT_SUPPORTED_KEYWORDS};

/// Arguments for the `jsv keywords` subcommand.
#[derive(Args, Debug, Default)]
pub struct KeywordsArgs {
    /// Print a JSON array instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Also list recognised keywords that are not supported.
    #[arg(long)]
    pub unsupported: bool,
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRow {
    /// Keyword name.
    pub name: String,
    /// Evaluation priority.
    pub order: i32,
    /// Registration rank; absent for not-supported keywords.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_order: Option<usize>,
    /// True for recognised-but-unimplemented keywords.
    pub supported: bool,
}

/// Execute the keywords subcommand. Always exits 0.
pub fn run_keywords(args: &KeywordsArgs) -> Result<u8> {
    let registry = copy_global_keyword_registry();
    print!("{}", render_keywords(&registry, args)?);
    Ok(0)
}

/// Collect the rows for `registry`.
pub fn keyword_rows(registry: &KeywordRegistry, include_unsupported: bool) -> Vec<KeywordRow> {
    let mut rows: Vec<KeywordRow> = registry
        .keyword_names()
        .into_iter()
        .map(|name| KeywordRow {
            name: name.to_string(),
            order: registry.keyword_order(name),
            insert_order: Some(registry.keyword_insert_order(name)),
            supported: true,
        })
        .collect();

    if include_unsupported {
        rows.extend(NOT_SUPPORTED_KEYWORDS.iter().map(|name| KeywordRow {
            name: (*name).to_string(),
            order: registry.keyword_order(name),
            insert_order: None,
            supported: false,
        }));
    }
    rows
}

/// Render the listing as text or JSON.
pub fn render_keywords(registry: &KeywordRegistry, args: &KeywordsArgs) -> Result<String> {
    let rows = keyword_rows(registry, args.unsupported);
    if args.json {
        let mut out = serde_json::to_string_pretty(&rows)?;
        out.push('\n');
        return Ok(out);
    }

    let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in &rows {
        let rank = match row.insert_order {
            Some(rank) => rank.to_string(),
            None => "-".to_string(),
        };
        let note = if row.supported { "" } else { "  (not supported)" };
        out.push_str(&format!(
            "{:<width$}  {:>3}  {:>3}{note}\n",
            row.name, row.order, rank
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_schema::standard_keywords;

    #[test]
    fn rows_follow_evaluation_order() {
        let rows = keyword_rows(&standard_keywords(), false);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"$ref"));
        assert_eq!(names.last(), Some(&"additionalProperties"));
        let properties = rows.iter().find(|r| r.name == "properties").unwrap();
        assert_eq!(properties.order, 2);
        assert!(rows.iter().all(|r| r.supported));
    }

    #[test]
    fn unsupported_rows_are_appended() {
        let rows = keyword_rows(&standard_keywords(), true);
        let tail: Vec<&str> = rows
            .iter()
            .filter(|r| !r.supported)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(tail, NOT_SUPPORTED_KEYWORDS);
        assert!(rows.iter().filter(|r| !r.supported).all(|r| r.insert_order.is_none()));
    }

    #[test]
    fn json_output_parses() {
        let args = KeywordsArgs {
            json: true,
            unsupported: false,
        };
        let out = render_keywords(&standard_keywords(), &args).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "$ref");
        assert_eq!(parsed[0]["order"], 0);
        assert!(parsed[0].get("insertOrder").is_some());
    }

    #[test]
    fn text_output_has_one_line_per_keyword() {
        let registry = standard_keywords();
        let out = render_keywords(&registry, &KeywordsArgs::default()).unwrap();
        assert_eq!(out.lines().count(), registry.len());
        assert!(out.lines().any(|line| line.starts_with("type ")));
    }

    #[test]
    fn run_exits_zero() {
        assert_eq!(run_keywords(&KeywordsArgs::default()).unwrap(), 0);
    }
}
