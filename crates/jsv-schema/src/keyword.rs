//! # Keyword Protocol
//!
//! Every keyword variant (type checks, combinators, references,
//! annotations) implements [`Keyword`] so that compilation, validation
//! and resolution can treat them uniformly.
//!
//! ## Lifecycle
//!
//! 1. A [`KeyMaker`] stored in the [`KeywordRegistry`](crate::KeywordRegistry)
//!    produces a fresh, empty instance.
//! 2. [`Keyword::load`] populates it from the keyword's raw value,
//!    compiling nested schemas through the [`Compiler`].
//! 3. [`Keyword::register`] indexes any wrapped sub-schemas into the
//!    [`SchemaRegistry`] under the keyword's own location.
//! 4. [`Keyword::validate_keyword`] runs once per document location,
//!    appending [`KeyError`](jsv_core::KeyError)s to the state. It never
//!    aborts traversal: sibling keywords always run.
//! 5. [`Keyword::resolve`] walks a pointer through the keyword during
//!    `$ref` resolution.
//!
//! ## Resolution Outcomes
//!
//! [`Resolved`] keeps apart the two "nothing here" cases:
//! [`Resolved::Terminal`] (the keyword owns no sub-schema at that
//! location) and [`Resolved::Missing`] (the location does not exist).
//! [`Resolved::schema`] collapses both into `None` for callers that only
//! care whether a schema was found.

use std::fmt;
use std::sync::Arc;

use jsv_core::{Pointer, RunContext};
use serde_json::Value;

use crate::compiler::Compiler;
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::schema_registry::SchemaRegistry;
use crate::state::ValidationState;

/// The result of resolving a pointer through a keyword or schema.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// The pointer reached a schema.
    Schema(Arc<Schema>),
    /// The keyword is a leaf: its value is not a schema.
    Terminal,
    /// The pointer names a location that does not exist.
    Missing,
}

impl Resolved {
    /// The reached schema, if any.
    pub fn schema(self) -> Option<Arc<Schema>> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Terminal | Self::Missing => None,
        }
    }

    /// True if the pointer stopped at a leaf keyword.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// True if the pointer named a non-existent location.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Behavior shared by every schema keyword.
///
/// Implementations must be `Send + Sync`: compiled schemas are shared
/// across concurrent validation runs behind `Arc`.
pub trait Keyword: Send + Sync + fmt::Debug {
    /// Populate a freshly made instance from the keyword's raw value.
    ///
    /// `location` is the schema location of the keyword itself
    /// (e.g. `/properties/name/type`).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the value has the wrong shape or a
    /// nested schema fails to compile.
    fn load(
        &mut self,
        raw: &Value,
        compiler: &Compiler<'_>,
        location: &Pointer,
    ) -> Result<(), SchemaError>;

    /// Check `data` and append errors to `state` on violation.
    ///
    /// Must stop doing additional work once `ctx.is_done()`; errors
    /// already appended stay.
    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value);

    /// Index wrapped sub-schemas under `uri`, the keyword's own location.
    fn register(&self, uri: &str, registry: &mut SchemaRegistry);

    /// Resolve `pointer` (with this keyword's name already consumed)
    /// through this keyword. `uri` is the keyword's own location.
    fn resolve(&self, pointer: &Pointer, uri: &str) -> Resolved;

    /// True only for the [`Void`] fallback used for unknown keywords.
    fn is_void(&self) -> bool {
        false
    }
}

/// A keyword whose whole value is a nested schema (`not`,
/// `additionalProperties`, ...).
pub trait SchemaKeyword: Keyword {
    /// The wrapped schema.
    fn schema(&self) -> &Arc<Schema>;
}

/// Factory producing fresh keyword instances.
pub type KeyMaker = Arc<dyn Fn() -> Box<dyn Keyword> + Send + Sync>;

/// The no-op keyword returned for names the registry does not know.
///
/// Validates nothing, registers nothing, resolves nothing. Kept distinct
/// from supported-but-vacuous keywords through [`Keyword::is_void`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Void;

impl Void {
    /// A boxed instance, as returned by the registry.
    pub fn boxed() -> Box<dyn Keyword> {
        Box::new(Self)
    }
}

impl Keyword for Void {
    fn load(&mut self, _: &Value, _: &Compiler<'_>, _: &Pointer) -> Result<(), SchemaError> {
        Ok(())
    }

    fn validate_keyword(&self, _: &RunContext, _: &mut ValidationState, _: &Value) {}

    fn register(&self, _: &str, _: &mut SchemaRegistry) {}

    fn resolve(&self, _: &Pointer, _: &str) -> Resolved {
        Resolved::Missing
    }

    fn is_void(&self) -> bool {
        true
    }
}
