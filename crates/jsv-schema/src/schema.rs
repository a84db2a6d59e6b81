//! # Compiled Schema Node
//!
//! A [`Schema`] is either a boolean schema or an ordered list of keyword
//! instances. The order is fixed at compile time from the keyword
//! registry's `(priority, insert order)` key, so validation simply walks
//! the list.

use std::sync::Arc;

use jsv_core::pointer::join_uri_token;
use jsv_core::{Pointer, RunContext};
use serde_json::Value;

use crate::keyword::{Keyword, Resolved};
use crate::schema_registry::SchemaRegistry;
use crate::state::ValidationState;

/// One keyword of a compiled schema node.
#[derive(Debug)]
pub struct KeywordEntry {
    name: String,
    keyword: Box<dyn Keyword>,
}

impl KeywordEntry {
    /// Pair a keyword name with its loaded instance.
    pub fn new(name: impl Into<String>, keyword: Box<dyn Keyword>) -> Self {
        Self {
            name: name.into(),
            keyword,
        }
    }

    /// The keyword name as written in the schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The loaded keyword.
    pub fn keyword(&self) -> &dyn Keyword {
        self.keyword.as_ref()
    }
}

#[derive(Debug)]
enum SchemaKind {
    Bool(bool),
    Keywords(Vec<KeywordEntry>),
}

/// A node of a compiled schema tree.
#[derive(Debug)]
pub struct Schema {
    id: Option<String>,
    kind: SchemaKind,
}

impl Schema {
    /// A boolean schema: `true` accepts everything, `false` nothing.
    pub fn boolean(value: bool) -> Self {
        Self {
            id: None,
            kind: SchemaKind::Bool(value),
        }
    }

    /// A keyword schema. `entries` must already be in evaluation order.
    pub fn from_entries(id: Option<String>, entries: Vec<KeywordEntry>) -> Self {
        Self {
            id,
            kind: SchemaKind::Keywords(entries),
        }
    }

    /// The `$id` of this node, if it declared one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The boolean value of a boolean schema.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            SchemaKind::Bool(b) => Some(b),
            SchemaKind::Keywords(_) => None,
        }
    }

    /// Keyword entries in evaluation order (empty for boolean schemas).
    pub fn entries(&self) -> &[KeywordEntry] {
        match &self.kind {
            SchemaKind::Bool(_) => &[],
            SchemaKind::Keywords(entries) => entries,
        }
    }

    /// Keyword names in evaluation order.
    pub fn keyword_names(&self) -> impl Iterator<Item = &str> {
        self.entries().iter().map(KeywordEntry::name)
    }

    /// The keyword stored under `name`.
    pub fn keyword(&self, name: &str) -> Option<&dyn Keyword> {
        self.entries()
            .iter()
            .find(|entry| entry.name == name)
            .map(KeywordEntry::keyword)
    }

    /// Run every keyword against `data`, in order.
    ///
    /// Keywords never short-circuit each other; the loop only stops
    /// early once `ctx` is done.
    pub fn validate(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        match &self.kind {
            SchemaKind::Bool(true) => {}
            SchemaKind::Bool(false) => state.add_error(data, "false schema never validates"),
            SchemaKind::Keywords(entries) => {
                for entry in entries {
                    if ctx.is_done() {
                        tracing::debug!(
                            location = %state.instance_location(),
                            keyword = %entry.name,
                            "validation cancelled"
                        );
                        return;
                    }
                    entry.keyword.validate_keyword(ctx, state, data);
                }
            }
        }
    }

    /// Index this node under `uri` (and its `$id`), then let every keyword
    /// index its sub-schemas under `uri` + keyword name.
    pub fn register(self: &Arc<Self>, uri: &str, registry: &mut SchemaRegistry) {
        registry.register(uri, Arc::clone(self));
        if let Some(id) = &self.id {
            if id != uri {
                registry.register(id.clone(), Arc::clone(self));
            }
        }
        for entry in self.entries() {
            entry
                .keyword
                .register(&join_uri_token(uri, &entry.name), registry);
        }
    }

    /// Walk `pointer` from this node.
    ///
    /// The first token selects a keyword; that keyword consumes whatever
    /// tokens it owns and resolves the rest.
    pub fn resolve(self: &Arc<Self>, pointer: &Pointer, uri: &str) -> Resolved {
        let Some(token) = pointer.head() else {
            return Resolved::Schema(Arc::clone(self));
        };
        match self.entries().iter().find(|entry| entry.name == token) {
            Some(entry) => entry
                .keyword
                .resolve(&pointer.tail(), &join_uri_token(uri, token)),
            None => Resolved::Missing,
        }
    }
}
