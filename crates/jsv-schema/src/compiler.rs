//! # Schema Compiler
//!
//! Turns a decoded schema document into a [`Schema`] tree using a
//! [`KeywordRegistry`]. Compile against a snapshot
//! ([`SharedKeywordRegistry::snapshot`](crate::SharedKeywordRegistry::snapshot))
//! so per-lookup locking is avoided and per-compilation customisations
//! stay private.
//!
//! For every member of a schema object the compiler:
//!
//! 1. classifies the name: not-supported names are logged (or rejected
//!    with [`CompileOptions::reject_unsupported`]); unknown names become
//!    [`Void`](crate::Void) and are ignored;
//! 2. builds a fresh keyword via [`KeywordRegistry::get_keyword`] and
//!    loads it from the member's value;
//! 3. sorts the node's keywords by [`KeywordRegistry::ordering_key`].

use jsv_core::Pointer;
use serde_json::Value;

use crate::error::SchemaError;
use crate::registry::KeywordRegistry;
use crate::schema::{KeywordEntry, Schema};

/// Compiler switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Fail on known-but-unsupported keywords instead of ignoring them.
    pub reject_unsupported: bool,
}

/// Compiles schema documents against one keyword registry.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r KeywordRegistry,
    options: CompileOptions,
}

impl<'r> Compiler<'r> {
    /// A compiler with default options.
    pub fn new(registry: &'r KeywordRegistry) -> Self {
        Self::with_options(registry, CompileOptions::default())
    }

    /// A compiler with explicit options.
    pub fn with_options(registry: &'r KeywordRegistry, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    /// The registry keywords are looked up in.
    pub fn registry(&self) -> &'r KeywordRegistry {
        self.registry
    }

    /// The active options.
    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Compile a root schema.
    ///
    /// # Errors
    ///
    /// See [`Compiler::compile_at`].
    pub fn compile(&self, raw: &Value) -> Result<Schema, SchemaError> {
        let schema = self.compile_at(raw, &Pointer::root())?;
        tracing::debug!(keywords = schema.entries().len(), "compiled schema");
        Ok(schema)
    }

    /// Compile the schema found at `location` of the enclosing document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidSchema`] if `raw` is neither an object
    /// nor a boolean, [`SchemaError::UnsupportedKeyword`] when rejecting
    /// unsupported keywords, and whatever a keyword's `load` returns.
    pub fn compile_at(&self, raw: &Value, location: &Pointer) -> Result<Schema, SchemaError> {
        let members = match raw {
            Value::Bool(b) => return Ok(Schema::boolean(*b)),
            Value::Object(members) => members,
            other => {
                return Err(SchemaError::InvalidSchema {
                    location: location.to_string(),
                    reason: format!("expected object or boolean, found {}", json_type(other)),
                })
            }
        };

        let mut entries = Vec::with_capacity(members.len());
        for (name, value) in members {
            let keyword_location = location.descendant(name.as_str());

            if self.registry.is_not_supported_keyword(name) {
                if self.options.reject_unsupported {
                    return Err(SchemaError::UnsupportedKeyword {
                        keyword: name.clone(),
                        location: keyword_location.to_string(),
                    });
                }
                tracing::warn!(
                    keyword = %name,
                    location = %keyword_location,
                    "keyword is not supported; ignoring"
                );
            } else if !self.registry.is_registered_keyword(name) {
                tracing::trace!(keyword = %name, location = %keyword_location, "unknown keyword");
            }

            let mut keyword = self.registry.get_keyword(name);
            keyword.load(value, self, &keyword_location)?;
            entries.push(KeywordEntry::new(name.clone(), keyword));
        }

        entries.sort_by_key(|entry| self.registry.ordering_key(entry.name()));

        let id = members
            .get("$id")
            .and_then(Value::as_str)
            .map(|id| id.trim_end_matches('#').to_string());

        Ok(Schema::from_entries(id, entries))
    }
}

/// JSON type name of a value, as used in schema `type` keywords.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
