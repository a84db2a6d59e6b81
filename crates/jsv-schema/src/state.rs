//! # Validation State
//!
//! Mutable per-run state threaded through every keyword: the current
//! instance location, accumulated errors, the property names evaluated
//! at the current object, and the schema store `$ref` resolves against.
//!
//! Combinators evaluate branches on a [`ValidationState::fork`] so a
//! failing branch can be inspected without touching the parent's errors.

use std::collections::HashSet;
use std::sync::Arc;

use jsv_core::{KeyError, Pointer};
use serde_json::Value;

use crate::schema_registry::SchemaRegistry;

/// Hard cap on `$ref` nesting along one evaluation path.
///
/// Real cycles are caught earlier by [`ValidationState::enter_ref`]; the
/// cap only bounds recursion for schemas that keep descending.
pub const MAX_REF_DEPTH: usize = 512;

/// Outcome of [`ValidationState::enter_ref`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefEntry {
    /// The reference may be followed.
    Entered,
    /// The same target is already being evaluated at the same instance
    /// location: following it would never terminate.
    Cycle,
    /// [`MAX_REF_DEPTH`] was reached.
    TooDeep,
}

/// State of one validation run.
#[derive(Debug, Clone)]
pub struct ValidationState {
    instance_location: Pointer,
    errors: Vec<KeyError>,
    evaluated_properties: HashSet<String>,
    store: Arc<SchemaRegistry>,
    base_uri: String,
    ref_depth: usize,
    active_refs: Vec<(String, String)>,
}

impl ValidationState {
    /// A state resolving references in `store` relative to `base_uri`.
    pub fn new(store: Arc<SchemaRegistry>, base_uri: impl Into<String>) -> Self {
        Self {
            instance_location: Pointer::root(),
            errors: Vec::new(),
            evaluated_properties: HashSet::new(),
            store,
            base_uri: base_uri.into(),
            ref_depth: 0,
            active_refs: Vec::new(),
        }
    }

    /// A state with an empty store, for validating self-contained schemas.
    pub fn standalone() -> Self {
        Self::new(Arc::new(SchemaRegistry::new()), "")
    }

    /// Location of the value currently being validated.
    pub fn instance_location(&self) -> &Pointer {
        &self.instance_location
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[KeyError] {
        &self.errors
    }

    /// Consume the state, yielding its errors.
    pub fn into_errors(self) -> Vec<KeyError> {
        self.errors
    }

    /// True if no error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error for `data` at the current location.
    pub fn add_error(&mut self, data: &Value, message: impl Into<String>) {
        let error = KeyError::new(message)
            .with_path(self.instance_location.to_string())
            .with_value(data.clone());
        self.errors.push(error);
    }

    /// Record a fully built error.
    pub fn push_error(&mut self, error: KeyError) {
        self.errors.push(error);
    }

    /// Run `f` one level deeper, at `token` below the current location.
    ///
    /// The evaluated-property set is scoped to the child value and
    /// restored afterwards.
    pub fn descend<R>(&mut self, token: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.instance_location.push(token);
        let saved = std::mem::take(&mut self.evaluated_properties);
        let out = f(self);
        self.evaluated_properties = saved;
        self.instance_location.pop();
        out
    }

    /// A sibling state at the same location with no errors and no
    /// evaluated properties.
    pub fn fork(&self) -> Self {
        Self {
            instance_location: self.instance_location.clone(),
            errors: Vec::new(),
            evaluated_properties: HashSet::new(),
            store: Arc::clone(&self.store),
            base_uri: self.base_uri.clone(),
            ref_depth: self.ref_depth,
            active_refs: self.active_refs.clone(),
        }
    }

    /// Take the errors of a forked state.
    pub fn absorb_errors(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Take both the errors and the evaluated properties of a forked state.
    pub fn absorb(&mut self, other: Self) {
        self.evaluated_properties.extend(other.evaluated_properties);
        self.errors.extend(other.errors);
    }

    /// Note that `name` of the current object was checked by some keyword.
    pub fn mark_evaluated(&mut self, name: impl Into<String>) {
        self.evaluated_properties.insert(name.into());
    }

    /// True if `name` of the current object was already checked.
    pub fn is_evaluated(&self, name: &str) -> bool {
        self.evaluated_properties.contains(name)
    }

    /// The schema store references resolve against.
    pub fn store(&self) -> &SchemaRegistry {
        &self.store
    }

    /// The URI fragment-only references are relative to.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Current `$ref` nesting depth.
    pub fn ref_depth(&self) -> usize {
        self.ref_depth
    }

    /// Enter the `$ref` target `target` at the current instance location.
    ///
    /// Returns [`RefEntry::Cycle`] if `target` is already being evaluated
    /// at this location further up the path, and [`RefEntry::TooDeep`]
    /// once [`MAX_REF_DEPTH`] is hit. Entries are never popped: `$ref`
    /// validates on a fork, and the fork is dropped when the reference is
    /// done.
    pub fn enter_ref(&mut self, target: &str) -> RefEntry {
        let target = target.strip_suffix('#').unwrap_or(target);
        let location = self.instance_location.to_string();
        if self
            .active_refs
            .iter()
            .any(|(uri, at)| uri == target && *at == location)
        {
            return RefEntry::Cycle;
        }
        if self.ref_depth >= MAX_REF_DEPTH {
            return RefEntry::TooDeep;
        }
        self.ref_depth += 1;
        self.active_refs.push((target.to_string(), location));
        RefEntry::Entered
    }

    /// Make fragment-only references relative to `base_uri` from now on.
    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.base_uri = base_uri.into();
    }
}
