//! Object applicators: `properties` and `additionalProperties`.
//!
//! `properties` marks every instance member it checks as evaluated;
//! `additionalProperties` runs later (higher priority number) and only
//! looks at members left unmarked. Both only apply to object instances.

use std::collections::BTreeMap;
use std::sync::Arc;

use jsv_core::{Pointer, RunContext};
use serde_json::Value;

use super::{compile_schema, compile_schema_map, register_schema_map, resolve_in_map};
use crate::compiler::Compiler;
use crate::error::SchemaError;
use crate::keyword::{Keyword, Resolved, SchemaKeyword};
use crate::schema::Schema;
use crate::schema_registry::SchemaRegistry;
use crate::state::ValidationState;

/// `properties`: named members must satisfy their schemas.
#[derive(Debug, Default)]
pub struct Properties {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl Properties {
    /// Property names with a schema, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl Keyword for Properties {
    fn load(
        &mut self,
        raw: &Value,
        compiler: &Compiler<'_>,
        location: &Pointer,
    ) -> Result<(), SchemaError> {
        self.schemas = compile_schema_map("properties", raw, compiler, location)?;
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        let Value::Object(members) = data else {
            return;
        };
        for (name, schema) in &self.schemas {
            if ctx.is_done() {
                return;
            }
            if let Some(value) = members.get(name) {
                state.mark_evaluated(name.as_str());
                state.descend(name.as_str(), |s| schema.validate(ctx, s, value));
            }
        }
    }

    fn register(&self, uri: &str, registry: &mut SchemaRegistry) {
        register_schema_map(&self.schemas, uri, registry);
    }

    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved {
        resolve_in_map(&self.schemas, pointer, uri)
    }
}

/// `additionalProperties`: members not covered by `properties` must
/// satisfy one schema.
#[derive(Debug)]
pub struct AdditionalProperties {
    schema: Arc<Schema>,
}

impl Default for AdditionalProperties {
    fn default() -> Self {
        Self {
            schema: Arc::new(Schema::boolean(true)),
        }
    }
}

impl Keyword for AdditionalProperties {
    fn load(
        &mut self,
        raw: &Value,
        compiler: &Compiler<'_>,
        location: &Pointer,
    ) -> Result<(), SchemaError> {
        self.schema = compile_schema(raw, compiler, location)?;
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        let Value::Object(members) = data else {
            return;
        };
        let extra: Vec<(&String, &Value)> = members
            .iter()
            .filter(|(name, _)| !state.is_evaluated(name))
            .collect();

        for (name, value) in extra {
            if ctx.is_done() {
                return;
            }
            state.descend(name.as_str(), |s| {
                if self.schema.as_bool() == Some(false) {
                    s.add_error(value, format!("additional property \"{name}\" is not allowed"));
                } else {
                    self.schema.validate(ctx, s, value);
                }
            });
            state.mark_evaluated(name.as_str());
        }
    }

    fn register(&self, uri: &str, registry: &mut SchemaRegistry) {
        self.schema.register(uri, registry);
    }

    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved {
        self.schema.resolve(pointer, uri)
    }
}

impl SchemaKeyword for AdditionalProperties {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}
