//! Boolean combinators: `allOf`, `anyOf`, `oneOf`, `not`.
//!
//! Each branch validates on a forked state. `allOf` keeps every branch
//! error; the others only look at whether a branch passed and report one
//! error of their own.

use std::sync::Arc;

use jsv_core::{Pointer, RunContext};
use serde_json::Value;

use super::{compile_schema, compile_schema_list, register_schema_list, resolve_in_list};
use crate::compiler::Compiler;
use crate::error::SchemaError;
use crate::keyword::{Keyword, Resolved, SchemaKeyword};
use crate::schema::Schema;
use crate::schema_registry::SchemaRegistry;
use crate::state::ValidationState;

/// Validate `data` against one branch, returning the branch state.
fn run_branch(
    schema: &Schema,
    ctx: &RunContext,
    state: &ValidationState,
    data: &Value,
) -> ValidationState {
    let mut branch = state.fork();
    schema.validate(ctx, &mut branch, data);
    branch
}

/// `allOf`: every branch must pass.
#[derive(Debug, Default)]
pub struct AllOf {
    schemas: Vec<Arc<Schema>>,
}

impl Keyword for AllOf {
    fn load(
        &mut self,
        raw: &Value,
        compiler: &Compiler<'_>,
        location: &Pointer,
    ) -> Result<(), SchemaError> {
        self.schemas = compile_schema_list("allOf", raw, compiler, location)?;
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        for schema in &self.schemas {
            if ctx.is_done() {
                return;
            }
            let branch = run_branch(schema, ctx, state, data);
            state.absorb_errors(branch);
        }
    }

    fn register(&self, uri: &str, registry: &mut SchemaRegistry) {
        register_schema_list(&self.schemas, uri, registry);
    }

    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved {
        resolve_in_list(&self.schemas, pointer, uri)
    }
}

/// `anyOf`: at least one branch must pass.
#[derive(Debug, Default)]
pub struct AnyOf {
    schemas: Vec<Arc<Schema>>,
}

impl Keyword for AnyOf {
    fn load(
        &mut self,
        raw: &Value,
        compiler: &Compiler<'_>,
        location: &Pointer,
    ) -> Result<(), SchemaError> {
        self.schemas = compile_schema_list("anyOf", raw, compiler, location)?;
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        for schema in &self.schemas {
            if ctx.is_done() {
                return;
            }
            if run_branch(schema, ctx, state, data).is_valid() {
                return;
            }
        }
        if ctx.is_done() {
            return;
        }
        state.add_error(
            data,
            format!("must match at least one of {} anyOf schemas", self.schemas.len()),
        );
    }

    fn register(&self, uri: &str, registry: &mut SchemaRegistry) {
        register_schema_list(&self.schemas, uri, registry);
    }

    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved {
        resolve_in_list(&self.schemas, pointer, uri)
    }
}

/// `oneOf`: exactly one branch must pass.
#[derive(Debug, Default)]
pub struct OneOf {
    schemas: Vec<Arc<Schema>>,
}

impl Keyword for OneOf {
    fn load(
        &mut self,
        raw: &Value,
        compiler: &Compiler<'_>,
        location: &Pointer,
    ) -> Result<(), SchemaError> {
        self.schemas = compile_schema_list("oneOf", raw, compiler, location)?;
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        let mut matched = 0usize;
        for schema in &self.schemas {
            if ctx.is_done() {
                return;
            }
            if run_branch(schema, ctx, state, data).is_valid() {
                matched += 1;
            }
        }
        if ctx.is_done() || matched == 1 {
            return;
        }
        let message = if matched == 0 {
            "must match exactly one oneOf schema, matched none".to_string()
        } else {
            format!("must match exactly one oneOf schema, matched {matched}")
        };
        state.add_error(data, message);
    }

    fn register(&self, uri: &str, registry: &mut SchemaRegistry) {
        register_schema_list(&self.schemas, uri, registry);
    }

    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved {
        resolve_in_list(&self.schemas, pointer, uri)
    }
}

/// `not`: the wrapped schema must fail.
#[derive(Debug)]
pub struct Not {
    schema: Arc<Schema>,
}

impl Default for Not {
    fn default() -> Self {
        Self {
            schema: Arc::new(Schema::boolean(false)),
        }
    }
}

impl Keyword for Not {
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
        if ctx.is_done() {
            return;
        }
        let branch = run_branch(&self.schema, ctx, state, data);
        // A cancelled branch may look valid only because it stopped early.
        if branch.is_valid() && !ctx.is_done() {
            state.add_error(data, "must not match the not schema");
        }
    }

    fn register(&self, uri: &str, registry: &mut SchemaRegistry) {
        self.schema.register(uri, registry);
    }

    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved {
        self.schema.resolve(pointer, uri)
    }
}

impl SchemaKeyword for Not {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::standard_keywords;
    use serde_json::json;

    fn messages(schema: Value, data: Value) -> Vec<String> {
        let registry = standard_keywords();
        let schema = Compiler::new(&registry).compile(&schema).unwrap();
        let mut state = ValidationState::standalone();
        schema.validate(&RunContext::background(), &mut state, &data);
        state.into_errors().into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn all_of_keeps_branch_errors() {
        let msgs = messages(
            json!({"allOf": [{"type": "string"}, {"const": "x"}, true]}),
            json!(1),
        );
        assert_eq!(msgs.len(), 2);
        assert!(messages(json!({"allOf": [{"type": "string"}]}), json!("s")).is_empty());
    }

    #[test]
    fn any_of_needs_one_passing_branch() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "null"}]});
        assert!(messages(schema.clone(), json!(null)).is_empty());
        assert_eq!(
            messages(schema, json!(1)),
            ["must match at least one of 2 anyOf schemas"]
        );
    }

    #[test]
    fn one_of_counts_matches() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "number"}]});
        assert!(messages(schema.clone(), json!(1.5)).is_empty());
        assert_eq!(
            messages(schema.clone(), json!(1)),
            ["must match exactly one oneOf schema, matched 2"]
        );
        assert_eq!(
            messages(schema, json!("x")),
            ["must match exactly one oneOf schema, matched none"]
        );
    }

    #[test]
    fn not_inverts() {
        let schema = json!({"not": {"type": "string"}});
        assert!(messages(schema.clone(), json!(1)).is_empty());
        assert_eq!(messages(schema, json!("s")), ["must not match the not schema"]);
    }

    #[test]
    fn lists_must_be_non_empty_arrays() {
        let registry = standard_keywords();
        let compiler = Compiler::new(&registry);
        for raw in [json!([]), json!({}), json!("x")] {
            assert!(AllOf::default().load(&raw, &compiler, &Pointer::root()).is_err());
        }
    }

    #[test]
    fn resolve_consumes_index() {
        let registry = standard_keywords();
        let mut kw = OneOf::default();
        kw.load(
            &json!([{"type": "null"}, {"not": {"type": "string"}}]),
            &Compiler::new(&registry),
            &Pointer::parse("/oneOf").unwrap(),
        )
        .unwrap();
        assert!(kw.resolve(&Pointer::parse("/1/not").unwrap(), "s#/oneOf").schema().is_some());
        assert!(kw.resolve(&Pointer::parse("/2").unwrap(), "s#/oneOf").is_missing());
        assert!(kw.resolve(&Pointer::parse("/01").unwrap(), "s#/oneOf").is_missing());
        assert!(kw.resolve(&Pointer::root(), "s#/oneOf").is_terminal());
    }

    #[test]
    fn register_indexes_branches() {
        let registry = standard_keywords();
        let mut kw = AnyOf::default();
        kw.load(&json!([true, false]), &Compiler::new(&registry), &Pointer::root())
            .unwrap();
        let mut store = SchemaRegistry::new();
        kw.register("s.json#/anyOf", &mut store);
        assert_eq!(store.uris(), ["s.json#/anyOf/0", "s.json#/anyOf/1"]);
    }

    #[test]
    fn not_exposes_its_schema() {
        assert_eq!(Not::default().schema().as_bool(), Some(false));
    }
}
