//! Identifier, reference and annotation keywords.

use std::collections::BTreeMap;
use std::sync::Arc;

use jsv_core::{Pointer, RunContext};
use serde_json::Value;

use super::{compile_schema_map, register_schema_map, resolve_in_map};
use crate::compiler::Compiler;
use crate::error::SchemaError;
use crate::keyword::{Keyword, Resolved};
use crate::schema::Schema;
use crate::schema_registry::{absolute_reference, SchemaRegistry};
use crate::state::{RefEntry, ValidationState, MAX_REF_DEPTH};

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A keyword that records its value and never fails validation.
///
/// Used for `$schema`, `$id`, `$comment`, `title`, `description`,
/// `default` and `examples`.
#[derive(Debug, Default, Clone)]
pub struct Annotation {
    value: Value,
}

impl Annotation {
    /// The raw annotation value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Keyword for Annotation {
    fn load(&mut self, raw: &Value, _: &Compiler<'_>, _: &Pointer) -> Result<(), SchemaError> {
        self.value = raw.clone();
        Ok(())
    }

    fn validate_keyword(&self, _: &RunContext, _: &mut ValidationState, _: &Value) {}

    fn register(&self, _: &str, _: &mut SchemaRegistry) {}

    fn resolve(&self, _: &Pointer, _: &str) -> Resolved {
        Resolved::Terminal
    }
}

// ---------------------------------------------------------------------------
// $defs
// ---------------------------------------------------------------------------

/// `$defs`: named schemas reachable only through `$ref`.
#[derive(Debug, Default)]
pub struct Defs {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl Defs {
    /// The definition stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }
}

impl Keyword for Defs {
    fn load(
        &mut self,
        raw: &Value,
        compiler: &Compiler<'_>,
        location: &Pointer,
    ) -> Result<(), SchemaError> {
        self.schemas = compile_schema_map("$defs", raw, compiler, location)?;
        Ok(())
    }

    fn validate_keyword(&self, _: &RunContext, _: &mut ValidationState, _: &Value) {}

    fn register(&self, uri: &str, registry: &mut SchemaRegistry) {
        register_schema_map(&self.schemas, uri, registry);
    }

    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved {
        resolve_in_map(&self.schemas, pointer, uri)
    }
}

// ---------------------------------------------------------------------------
// $ref
// ---------------------------------------------------------------------------

/// `$ref`: validates the instance against the referenced schema.
///
/// The target is looked up in the run's schema store each time the
/// keyword validates, so documents may reference each other regardless
/// of the order they were compiled in. An unresolvable reference is a
/// validation error, not a compile error, and so is a reference that
/// re-enters its own target without moving into the instance.
#[derive(Debug, Default, Clone)]
pub struct Ref {
    reference: String,
}

impl Ref {
    /// The reference as written.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The document a non-fragment reference points into.
    fn target_document(&self) -> Option<&str> {
        if self.reference.starts_with('#') {
            return None;
        }
        Some(
            self.reference
                .split_once('#')
                .map_or(self.reference.as_str(), |(document, _)| document),
        )
    }
}

impl Keyword for Ref {
    fn load(&mut self, raw: &Value, _: &Compiler<'_>, location: &Pointer) -> Result<(), SchemaError> {
        let reference = raw
            .as_str()
            .ok_or_else(|| SchemaError::invalid_keyword("$ref", location, "expected a string"))?;
        self.reference = reference.to_string();
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        if ctx.is_done() {
            return;
        }

        let Some(target) = state.store().resolve(&self.reference, state.base_uri()) else {
            tracing::trace!(
                reference = %self.reference,
                base = %state.base_uri(),
                "unresolved reference"
            );
            state.add_error(data, format!("could not resolve reference {}", self.reference));
            return;
        };

        let mut branch = state.fork();
        let target_uri = absolute_reference(&self.reference, state.base_uri());
        match branch.enter_ref(&target_uri) {
            RefEntry::Entered => {}
            RefEntry::Cycle => {
                state.add_error(data, format!("reference {} is circular", self.reference));
                return;
            }
            RefEntry::TooDeep => {
                state.add_error(
                    data,
                    format!(
                        "reference {} nests deeper than {MAX_REF_DEPTH} levels",
                        self.reference
                    ),
                );
                return;
            }
        }
        if let Some(document) = self.target_document() {
            branch.set_base_uri(document);
        }

        target.validate(ctx, &mut branch, data);
        state.absorb_errors(branch);
    }

    fn register(&self, _: &str, _: &mut SchemaRegistry) {}

    fn resolve(&self, _: &Pointer, _: &str) -> Resolved {
        Resolved::Terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::standard_keywords;
    use serde_json::json;

    fn store_with(raw: Value, uri: &str) -> Arc<SchemaRegistry> {
        let registry = standard_keywords();
        let schema = Arc::new(Compiler::new(&registry).compile(&raw).unwrap());
        let mut store = SchemaRegistry::new();
        schema.register(uri, &mut store);
        Arc::new(store)
    }

    fn loaded_ref(reference: &str) -> Ref {
        let registry = standard_keywords();
        let mut kw = Ref::default();
        kw.load(&json!(reference), &Compiler::new(&registry), &Pointer::root())
            .unwrap();
        kw
    }

    #[test]
    fn annotation_keeps_value_and_never_fails() {
        let registry = standard_keywords();
        let mut kw = Annotation::default();
        kw.load(&json!({"any": "thing"}), &Compiler::new(&registry), &Pointer::root())
            .unwrap();
        assert_eq!(kw.value(), &json!({"any": "thing"}));

        let mut state = ValidationState::standalone();
        kw.validate_keyword(&RunContext::background(), &mut state, &json!(42));
        assert!(state.is_valid());
        assert!(kw.resolve(&Pointer::root(), "s").is_terminal());
    }

    #[test]
    fn ref_requires_a_string() {
        let registry = standard_keywords();
        let err = Ref::default()
            .load(&json!(1), &Compiler::new(&registry), &Pointer::parse("/$ref").unwrap())
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKeyword { ref keyword, .. } if keyword == "$ref"));
    }

    #[test]
    fn ref_validates_against_target() {
        let store = store_with(json!({"$defs": {"s": {"type": "string"}}}), "root.json");
        let kw = loaded_ref("#/$defs/s");

        let mut state = ValidationState::new(Arc::clone(&store), "root.json");
        kw.validate_keyword(&RunContext::background(), &mut state, &json!("ok"));
        assert!(state.is_valid());

        kw.validate_keyword(&RunContext::background(), &mut state, &json!(3));
        assert_eq!(state.errors().len(), 1);
    }

    #[test]
    fn unresolved_ref_is_a_validation_error() {
        let kw = loaded_ref("#/$defs/missing");
        let mut state = ValidationState::standalone();
        kw.validate_keyword(&RunContext::background(), &mut state, &json!(null));
        assert_eq!(
            state.errors()[0].message,
            "could not resolve reference #/$defs/missing"
        );
    }

    #[test]
    fn self_reference_without_progress_is_circular() {
        let store = store_with(json!({"$ref": "#"}), "loop.json");
        let kw = loaded_ref("#");
        let mut state = ValidationState::new(store, "loop.json");
        kw.validate_keyword(&RunContext::background(), &mut state, &json!(1));
        assert_eq!(state.errors().len(), 1);
        assert_eq!(state.errors()[0].message, "reference # is circular");
    }

    #[test]
    fn mutual_references_without_progress_are_circular() {
        let store = store_with(
            json!({"$defs": {"a": {"$ref": "#/$defs/b"}, "b": {"$ref": "#/$defs/a"}}}),
            "pair.json",
        );
        let kw = loaded_ref("#/$defs/a");
        let mut state = ValidationState::new(store, "pair.json");
        kw.validate_keyword(&RunContext::background(), &mut state, &json!({}));
        assert_eq!(state.errors().len(), 1);
        assert_eq!(state.errors()[0].message, "reference #/$defs/a is circular");
    }

    #[test]
    fn recursive_schema_accepts_deeply_nested_data() {
        let store = store_with(
            json!({
                "$defs": {
                    "node": {
                        "type": "object",
                        "properties": {"next": {"$ref": "#/$defs/node"}}
                    }
                },
                "$ref": "#/$defs/node"
            }),
            "list.json",
        );

        let mut list = json!({});
        for _ in 0..100 {
            list = json!({"next": list});
        }

        let kw = loaded_ref("#/$defs/node");
        let mut state = ValidationState::new(Arc::clone(&store), "list.json");
        kw.validate_keyword(&RunContext::background(), &mut state, &list);
        assert!(state.is_valid(), "{:?}", state.errors());

        // A bad leaf is still found at full depth.
        let mut bad = json!({"next": 1});
        for _ in 0..100 {
            bad = json!({"next": bad});
        }
        let mut state = ValidationState::new(store, "list.json");
        kw.validate_keyword(&RunContext::background(), &mut state, &bad);
        assert_eq!(state.errors().len(), 1);
        assert_eq!(state.errors()[0].property_path, format!("{}/next", "/next".repeat(100)));
    }

    #[test]
    fn defs_resolve_by_name() {
        let registry = standard_keywords();
        let mut kw = Defs::default();
        kw.load(
            &json!({"a": {"type": "null"}}),
            &Compiler::new(&registry),
            &Pointer::parse("/$defs").unwrap(),
        )
        .unwrap();
        assert!(kw.get("a").is_some());
        assert!(kw.resolve(&Pointer::parse("/a").unwrap(), "s#/$defs").schema().is_some());
        assert!(kw.resolve(&Pointer::parse("/b").unwrap(), "s#/$defs").is_missing());
        assert!(kw.resolve(&Pointer::root(), "s#/$defs").is_terminal());
    }

    #[test]
    fn absolute_ref_switches_base_document() {
        let ref_kw = loaded_ref("https://example.com/b.json#/$defs/n");
        assert_eq!(ref_kw.target_document(), Some("https://example.com/b.json"));
        assert_eq!(loaded_ref("#/x").target_document(), None);
        assert_eq!(loaded_ref("other.json").target_document(), Some("other.json"));
    }
}
