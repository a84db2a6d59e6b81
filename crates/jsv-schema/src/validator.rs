//! # Compiled Schema Documents
//!
//! [`CompiledSchema`] bundles a compiled root with the schema store its
//! `$ref`s resolve against, and runs validation with a fresh
//! [`ValidationState`] per call. It is immutable once built and can be
//! shared across threads.

use std::sync::Arc;

use jsv_core::{KeyError, Pointer, RunContext};
use serde_json::Value;

use crate::compiler::{CompileOptions, Compiler};
use crate::error::SchemaError;
use crate::keyword::Resolved;
use crate::registry::KeywordRegistry;
use crate::schema::Schema;
use crate::schema_registry::SchemaRegistry;
use crate::state::ValidationState;

/// A compiled root schema and its reference store.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    uri: String,
    root: Arc<Schema>,
    store: Arc<SchemaRegistry>,
}

impl CompiledSchema {
    /// Compile a self-contained document under `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the document does not compile.
    pub fn compile(
        raw: &Value,
        uri: impl Into<String>,
        registry: &KeywordRegistry,
    ) -> Result<Self, SchemaError> {
        Self::compile_with(raw, uri, registry, CompileOptions::default(), SchemaRegistry::new())
    }

    /// Compile a document into an existing store, so its `$ref`s can reach
    /// documents registered earlier.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the document does not compile.
    pub fn compile_with(
        raw: &Value,
        uri: impl Into<String>,
        registry: &KeywordRegistry,
        options: CompileOptions,
        mut store: SchemaRegistry,
    ) -> Result<Self, SchemaError> {
        let uri = uri.into();
        let root = Arc::new(Compiler::with_options(registry, options).compile(raw)?);
        root.register(&uri, &mut store);
        tracing::debug!(uri = %uri, locations = store.len(), "registered schema document");
        Ok(Self {
            uri,
            root,
            store: Arc::new(store),
        })
    }

    /// The URI the root was registered under.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The compiled root.
    pub fn root(&self) -> &Arc<Schema> {
        &self.root
    }

    /// Every location `$ref` can reach.
    pub fn store(&self) -> &SchemaRegistry {
        &self.store
    }

    /// Validate `data`, returning every error found before `ctx` was done.
    pub fn validate(&self, ctx: &RunContext, data: &Value) -> Vec<KeyError> {
        let mut state = ValidationState::new(Arc::clone(&self.store), self.uri.clone());
        self.root.validate(ctx, &mut state, data);
        let errors = state.into_errors();
        tracing::debug!(
            uri = %self.uri,
            errors = errors.len(),
            cancelled = ctx.is_done(),
            "validated document"
        );
        errors
    }

    /// True if `data` validates without errors.
    pub fn is_valid(&self, data: &Value) -> bool {
        self.validate(&RunContext::background(), data).is_empty()
    }

    /// Walk `pointer` from the root.
    pub fn resolve(&self, pointer: &Pointer) -> Resolved {
        self.root.resolve(pointer, &self.uri)
    }
}
