//! # Standard Keywords
//!
//! The built-in keyword set and the [`standard_keywords`] builder that
//! registers it. Every built-in variant is registered here, in one place
//! and in a fixed order, so insertion-order tie-breaks are reproducible
//! from run to run.
//!
//! | Module | Keywords |
//! |--------|----------|
//! | [`meta`] | `$schema`, `$id`, `$comment`, `$defs`, `$ref`, metadata annotations |
//! | [`validation`] | `type`, `const`, `enum`, `required` |
//! | [`object`] | `properties`, `additionalProperties` |
//! | [`combinator`] | `allOf`, `anyOf`, `oneOf`, `not` |

pub mod combinator;
pub mod meta;
pub mod object;
pub mod validation;

use std::collections::BTreeMap;
use std::sync::Arc;

use jsv_core::pointer::join_uri_token;
use jsv_core::Pointer;
use serde_json::Value;

use crate::compiler::Compiler;
use crate::error::SchemaError;
use crate::keyword::Resolved;
use crate::registry::KeywordRegistry;
use crate::schema::Schema;
use crate::schema_registry::SchemaRegistry;

pub use self::combinator::{AllOf, AnyOf, Not, OneOf};
pub use self::meta::{Annotation, Defs, Ref};
pub use self::object::{AdditionalProperties, Properties};
pub use self::validation::{Const, Enum, Required, Type};

/// Priority of `$ref`: evaluated before every default-priority keyword.
pub const REF_ORDER: i32 = 0;
/// Priority of `properties`: after the default-priority checks.
pub const PROPERTIES_ORDER: i32 = 2;
/// Priority of `additionalProperties`: after `properties` has marked the
/// names it evaluated.
pub const ADDITIONAL_PROPERTIES_ORDER: i32 = 3;

/// Names of annotation-only keywords.
pub const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
];

/// A fresh registry holding the standard keyword set.
pub fn standard_keywords() -> KeywordRegistry {
    let mut registry = KeywordRegistry::new();
    register_standard_keywords(&mut registry);
    registry
}

/// Register the standard keyword set into `registry`.
///
/// Names already present keep their insertion order and get the standard
/// factory.
pub fn register_standard_keywords(registry: &mut KeywordRegistry) {
    for name in ANNOTATION_KEYWORDS {
        registry.register_keyword_type::<Annotation>(*name);
    }
    registry.register_keyword_type::<Defs>("$defs");
    registry.register_keyword_type::<Ref>("$ref");

    registry.register_keyword_type::<Type>("type");
    registry.register_keyword_type::<Const>("const");
    registry.register_keyword_type::<Enum>("enum");
    registry.register_keyword_type::<Required>("required");

    registry.register_keyword_type::<Properties>("properties");
    registry.register_keyword_type::<AdditionalProperties>("additionalProperties");

    registry.register_keyword_type::<AllOf>("allOf");
    registry.register_keyword_type::<AnyOf>("anyOf");
    registry.register_keyword_type::<OneOf>("oneOf");
    registry.register_keyword_type::<Not>("not");

    registry.set_keyword_order("$ref", REF_ORDER);
    registry.set_keyword_order("properties", PROPERTIES_ORDER);
    registry.set_keyword_order("additionalProperties", ADDITIONAL_PROPERTIES_ORDER);
}

// ---------------------------------------------------------------------------
// Shared helpers for keywords that wrap schemas
// ---------------------------------------------------------------------------

/// Compile a keyword value that must itself be a schema.
pub(crate) fn compile_schema(
    raw: &Value,
    compiler: &Compiler<'_>,
    location: &Pointer,
) -> Result<Arc<Schema>, SchemaError> {
    compiler.compile_at(raw, location).map(Arc::new)
}

/// Compile a keyword value that must be a non-empty array of schemas.
pub(crate) fn compile_schema_list(
    keyword: &str,
    raw: &Value,
    compiler: &Compiler<'_>,
    location: &Pointer,
) -> Result<Vec<Arc<Schema>>, SchemaError> {
    let items = raw
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| {
            SchemaError::invalid_keyword(keyword, location, "expected a non-empty array of schemas")
        })?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| compile_schema(item, compiler, &location.descendant(i.to_string())))
        .collect()
}

/// Compile a keyword value that must be an object of named schemas.
pub(crate) fn compile_schema_map(
    keyword: &str,
    raw: &Value,
    compiler: &Compiler<'_>,
    location: &Pointer,
) -> Result<BTreeMap<String, Arc<Schema>>, SchemaError> {
    let members = raw.as_object().ok_or_else(|| {
        SchemaError::invalid_keyword(keyword, location, "expected an object of schemas")
    })?;
    members
        .iter()
        .map(|(name, value)| {
            let schema = compile_schema(value, compiler, &location.descendant(name.as_str()))?;
            Ok((name.clone(), schema))
        })
        .collect()
}

/// Register a list of schemas under `uri/0`, `uri/1`, ...
pub(crate) fn register_schema_list(schemas: &[Arc<Schema>], uri: &str, registry: &mut SchemaRegistry) {
    for (i, schema) in schemas.iter().enumerate() {
        schema.register(&join_uri_token(uri, &i.to_string()), registry);
    }
}

/// Register named schemas under `uri/<name>`.
pub(crate) fn register_schema_map(
    schemas: &BTreeMap<String, Arc<Schema>>,
    uri: &str,
    registry: &mut SchemaRegistry,
) {
    for (name, schema) in schemas {
        schema.register(&join_uri_token(uri, name), registry);
    }
}

/// Consume an index token and resolve the rest inside that list entry.
pub(crate) fn resolve_in_list(schemas: &[Arc<Schema>], pointer: &Pointer, uri: &str) -> Resolved {
    let Some(token) = pointer.head() else {
        return Resolved::Terminal;
    };
    match jsv_core::pointer::parse_index(token).and_then(|i| schemas.get(i)) {
        Some(schema) => schema.resolve(&pointer.tail(), &join_uri_token(uri, token)),
        None => Resolved::Missing,
    }
}

/// Consume a name token and resolve the rest inside that map entry.
pub(crate) fn resolve_in_map(
    schemas: &BTreeMap<String, Arc<Schema>>,
    pointer: &Pointer,
    uri: &str,
) -> Resolved {
    let Some(token) = pointer.head() else {
        return Resolved::Terminal;
    };
    match schemas.get(token) {
        Some(schema) => schema.resolve(&pointer.tail(), &join_uri_token(uri, token)),
        None => Resolved::Missing,
    }
}
