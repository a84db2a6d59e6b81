//! # Schema Registry
//!
//! URI-indexed store of compiled schema nodes. [`Schema::register`]
//! fills it with every node of a tree, keyed by `base#/json/pointer`
//! location (and by `$id` where declared). `$ref` resolution first looks
//! the target up directly and falls back to walking the pointer with
//! [`Schema::resolve`] from the referenced document's root.
//!
//! Nothing is fetched: a reference outside the registry simply does not
//! resolve.

use std::collections::HashMap;
use std::sync::Arc;

use jsv_core::Pointer;

use crate::schema::Schema;

/// Compiled schemas by URI.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `schema` under `uri`, returning any schema it replaced.
    ///
    /// A trailing empty fragment (`s.json#`) is dropped.
    pub fn register(&mut self, uri: impl Into<String>, schema: Arc<Schema>) -> Option<Arc<Schema>> {
        let uri = normalize(uri.into());
        tracing::trace!(uri = %uri, "registering schema");
        self.schemas.insert(uri, schema)
    }

    /// The schema stored under `uri`.
    pub fn get(&self, uri: &str) -> Option<Arc<Schema>> {
        self.schemas
            .get(uri.strip_suffix('#').unwrap_or(uri))
            .cloned()
    }

    /// True if something is stored under `uri`.
    pub fn contains(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    /// Number of indexed locations.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Indexed URIs, sorted.
    pub fn uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        uris.sort_unstable();
        uris
    }

    /// Resolve a `$ref` value against `base`.
    ///
    /// Fragment-only references (`#/...`) are relative to `base`; anything
    /// else is taken as an absolute URI.
    pub fn resolve(&self, reference: &str, base: &str) -> Option<Arc<Schema>> {
        let target = absolute_reference(reference, base);

        if let Some(schema) = self.get(&target) {
            return Some(schema);
        }

        let (document, fragment) = target.split_once('#')?;
        let root = self.get(document)?;
        let pointer = match Pointer::parse(fragment) {
            Ok(pointer) => pointer,
            Err(e) => {
                tracing::trace!(reference, error = %e, "malformed reference fragment");
                return None;
            }
        };
        root.resolve(&pointer, document).schema()
    }
}

/// The URI a `$ref` value names when read relative to `base`.
///
/// Fragment-only references (`#/...`) take `base`'s document; anything
/// else is already absolute.
pub fn absolute_reference(reference: &str, base: &str) -> String {
    if reference.starts_with('#') {
        format!("{}{reference}", base_document(base))
    } else {
        reference.to_string()
    }
}

fn normalize(uri: String) -> String {
    match uri.strip_suffix('#') {
        Some(stripped) => stripped.to_string(),
        None => uri,
    }
}

fn base_document(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(document, _)| document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::keywords::standard_keywords;
    use serde_json::json;

    fn registered(raw: serde_json::Value, uri: &str) -> (Arc<Schema>, SchemaRegistry) {
        let registry = standard_keywords();
        let schema = Arc::new(Compiler::new(&registry).compile(&raw).unwrap());
        let mut store = SchemaRegistry::new();
        schema.register(uri, &mut store);
        (schema, store)
    }

    #[test]
    fn absolute_reference_takes_the_base_document() {
        assert_eq!(absolute_reference("#/$defs/a", "s.json#/properties/x"), "s.json#/$defs/a");
        assert_eq!(absolute_reference("#", "s.json"), "s.json#");
        assert_eq!(absolute_reference("other.json#/a", "s.json"), "other.json#/a");
    }

    #[test]
    fn trailing_hash_is_ignored() {
        let (root, store) = registered(json!({"type": "string"}), "s.json#");
        assert!(Arc::ptr_eq(&store.get("s.json").unwrap(), &root));
        assert!(store.contains("s.json#"));
    }

    #[test]
    fn fragment_references_use_the_base_document() {
        let (_, store) = registered(
            json!({"$defs": {"name": {"type": "string"}}}),
            "https://example.com/s.json",
        );
        let found = store
            .resolve("#/$defs/name", "https://example.com/s.json#/properties/x")
            .unwrap();
        assert_eq!(found.keyword_names().collect::<Vec<_>>(), ["type"]);
        assert!(store.resolve("#", "https://example.com/s.json").is_some());
    }

    #[test]
    fn falls_back_to_pointer_walk() {
        let (root, _) = registered(
            json!({"properties": {"a~b": {"type": "string"}}}),
            "s.json",
        );
        // Keep only the root so the lookup has to walk the tree.
        let mut store = SchemaRegistry::new();
        store.register("s.json", root);
        assert_eq!(store.len(), 1);
        assert!(store.resolve("#/properties/a~0b", "s.json").is_some());
        assert!(store.resolve("#/properties/zz", "s.json").is_none());
        assert!(store.resolve("#/properties/a~2", "s.json").is_none());
    }

    #[test]
    fn absolute_references_cross_documents() {
        let (_, mut store) = registered(json!({"type": "integer"}), "https://example.com/int.json");
        let registry = standard_keywords();
        let other = Arc::new(
            Compiler::new(&registry)
                .compile(&json!({"$ref": "https://example.com/int.json"}))
                .unwrap(),
        );
        other.register("https://example.com/other.json", &mut store);
        assert!(store
            .resolve("https://example.com/int.json", "https://example.com/other.json")
            .is_some());
        assert!(store.resolve("https://nowhere.test/x.json", "").is_none());
        assert_eq!(
            store.uris(),
            [
                "https://example.com/int.json",
                "https://example.com/other.json"
            ]
        );
    }
}
