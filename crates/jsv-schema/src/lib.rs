//! # jsv-schema
//!
//! The keyword registry and keyword evaluation protocol of the `jsv` JSON
//! Schema validator, plus the schema tree that exercises them.
//!
//! ## Modules
//!
//! - [`keyword`] — the [`Keyword`] trait, [`Void`] fallback, [`Resolved`].
//! - [`registry`] — [`KeywordRegistry`] (name → factory, priority and
//!   insertion order) and the process-wide [`SharedKeywordRegistry`].
//! - [`compiler`] — decoded document → [`Schema`] tree.
//! - [`schema`], [`schema_registry`], [`state`] — compiled nodes, the
//!   URI-indexed store `$ref` resolves against, per-run state.
//! - [`keywords`] — the standard keyword set.
//! - [`validator`] — [`CompiledSchema`], the usual entry point.
//!
//! ## Example
//!
//! ```
//! use jsv_core::RunContext;
//! use jsv_schema::{standard_keywords, CompiledSchema};
//! use serde_json::json;
//!
//! let schema = CompiledSchema::compile(
//!     &json!({"type": "object", "required": ["name"]}),
//!     "mem://person.json",
//!     &standard_keywords(),
//! )
//! .unwrap();
//!
//! let errors = schema.validate(&RunContext::background(), &json!({}));
//! assert_eq!(errors[0].message, "\"name\" value is required");
//! ```

pub mod compiler;
pub mod error;
pub mod keyword;
pub mod keywords;
pub mod registry;
pub mod schema;
pub mod schema_registry;
pub mod state;
pub mod validator;

pub use compiler::{CompileOptions, Compiler};
pub use error::SchemaError;
pub use keyword::{KeyMaker, Keyword, Resolved, SchemaKeyword, Void};
pub use keywords::{register_standard_keywords, standard_keywords};
pub use registry::{
    copy_global_keyword_registry, is_not_supported_keyword, register_keyword, set_keyword_order,
    KeywordRegistry, SharedKeywordRegistry, DEFAULT_INSERT_ORDER, DEFAULT_KEYWORD_ORDER,
    NOT_SUPPORTED_KEYWORDS,
};
pub use schema::{KeywordEntry, Schema};
pub use schema_registry::SchemaRegistry;
pub use state::{RefEntry, ValidationState, MAX_REF_DEPTH};
pub use validator::CompiledSchema;
