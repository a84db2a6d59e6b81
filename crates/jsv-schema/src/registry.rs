//! # Keyword Registry
//!
//! Name-keyed directory of keyword factories plus the two orderings used
//! to sequence sibling keywords:
//!
//! - **priority** — explicitly assigned with
//!   [`KeywordRegistry::set_keyword_order`]; defaults to
//!   [`DEFAULT_KEYWORD_ORDER`].
//! - **insert order** — assigned automatically the first time a name is
//!   registered (0, 1, 2, …); unknown names report
//!   [`DEFAULT_INSERT_ORDER`], i.e. last.
//!
//! Callers evaluate a schema node's keywords sorted by
//! [`KeywordRegistry::ordering_key`] ascending.
//!
//! ## Two Forms
//!
//! - [`KeywordRegistry`] — a plain value with no interior locking. Cheap
//!   lookups; meant to be owned by one compilation.
//! - [`SharedKeywordRegistry`] — the same tables behind one
//!   `parking_lot::Mutex`, for registration from concurrent
//!   initialization. The lock is held only for table access: factories
//!   are cloned out under the lock and invoked after it is released.
//!   [`SharedKeywordRegistry::snapshot`] hands out an independent copy.
//!
//! [`SharedKeywordRegistry::global`] is the lazily-created process-wide
//! default, pre-populated with [`standard_keywords`](crate::standard_keywords).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::keyword::{KeyMaker, Keyword, Void};
use crate::keywords::standard_keywords;

/// Priority reported for names without an explicit order.
pub const DEFAULT_KEYWORD_ORDER: i32 = 1;

/// Insert order reported for names that were never registered.
pub const DEFAULT_INSERT_ORDER: usize = usize::MAX;

/// Keywords that are recognised but not implemented.
///
/// Vocabulary markers, content annotations, `deprecated`, and the draft-7
/// names kept for backward compatibility.
pub const NOT_SUPPORTED_KEYWORDS: &[&str] = &[
    // core
    "$vocabulary",
    // content and meta-data
    "contentEncoding",
    "contentMediaType",
    "contentSchema",
    "deprecated",
    // draft-7 aliases
    "definitions",
    "dependencies",
];

/// True if `name` is a recognised-but-unimplemented keyword.
///
/// Independent of any registry's contents.
pub fn is_not_supported_keyword(name: &str) -> bool {
    NOT_SUPPORTED_KEYWORDS.contains(&name)
}

/// Keyword factories and evaluation ordering.
///
/// `Clone` is a deep copy: the clone owns new tables and may be mutated
/// without affecting the source. Factories themselves are immutable and
/// shared.
#[derive(Clone, Default)]
pub struct KeywordRegistry {
    constructors: HashMap<String, KeyMaker>,
    priority_order: HashMap<String, i32>,
    insert_order: HashMap<String, usize>,
}

impl fmt::Debug for KeywordRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordRegistry")
            .field("keywords", &self.keyword_names())
            .field("priority_order", &self.priority_order)
            .finish()
    }
}

impl KeywordRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the factory for `name`.
    ///
    /// A name seen for the first time gets the next insert order;
    /// re-registration keeps the original one.
    pub fn register_keyword<F>(&mut self, name: impl Into<String>, maker: F)
    where
        F: Fn() -> Box<dyn Keyword> + Send + Sync + 'static,
    {
        self.register_maker(name, Arc::new(maker));
    }

    /// Register a keyword type built with `Default`.
    pub fn register_keyword_type<K>(&mut self, name: impl Into<String>)
    where
        K: Keyword + Default + 'static,
    {
        self.register_keyword(name, || Box::new(K::default()) as Box<dyn Keyword>);
    }

    /// Install or replace an already-shared factory.
    pub fn register_maker(&mut self, name: impl Into<String>, maker: KeyMaker) {
        let name = name.into();
        let next = self.insert_order.len();
        self.insert_order.entry(name.clone()).or_insert(next);
        self.constructors.insert(name, maker);
    }

    /// True if a factory is registered for `name`.
    pub fn is_registered_keyword(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// A fresh instance for `name`, or [`Void`] if `name` is unknown.
    pub fn get_keyword(&self, name: &str) -> Box<dyn Keyword> {
        match self.constructors.get(name) {
            Some(maker) => maker(),
            None => Void::boxed(),
        }
    }

    /// The factory for `name`, if registered.
    pub fn maker(&self, name: &str) -> Option<KeyMaker> {
        self.constructors.get(name).cloned()
    }

    /// Evaluation priority of `name`.
    pub fn keyword_order(&self, name: &str) -> i32 {
        self.priority_order
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_KEYWORD_ORDER)
    }

    /// Registration rank of `name`, used to break priority ties.
    pub fn keyword_insert_order(&self, name: &str) -> usize {
        self.insert_order
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_INSERT_ORDER)
    }

    /// Set the evaluation priority of `name`; `name` need not be
    /// registered.
    pub fn set_keyword_order(&mut self, name: impl Into<String>, order: i32) {
        self.priority_order.insert(name.into(), order);
    }

    /// See [`is_not_supported_keyword`].
    pub fn is_not_supported_keyword(&self, name: &str) -> bool {
        is_not_supported_keyword(name)
    }

    /// True once at least one keyword is registered.
    pub fn is_registry_loaded(&self) -> bool {
        !self.constructors.is_empty()
    }

    /// An independent deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// `(priority, insert order)` — sort ascending to get evaluation order.
    pub fn ordering_key(&self, name: &str) -> (i32, usize) {
        (self.keyword_order(name), self.keyword_insert_order(name))
    }

    /// Sort `names` into evaluation order. Names with equal keys (only
    /// possible for unregistered names) keep their relative order.
    pub fn sort_keyword_names<S: AsRef<str>>(&self, names: &mut [S]) {
        names.sort_by_key(|name| self.ordering_key(name.as_ref()));
    }

    /// All registered names, in evaluation order.
    pub fn keyword_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        self.sort_keyword_names(&mut names);
        names
    }

    /// Number of registered keywords.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

/// A [`KeywordRegistry`] behind a mutex, safe to mutate concurrently.
///
/// Cloning shares the underlying registry; use [`Self::snapshot`] for an
/// independent copy.
#[derive(Debug, Clone, Default)]
pub struct SharedKeywordRegistry {
    inner: Arc<Mutex<KeywordRegistry>>,
}

impl SharedKeywordRegistry {
    /// An empty shared registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing registry.
    pub fn from_registry(registry: KeywordRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// The process-wide default, created on first access and populated
    /// with the standard keyword set.
    pub fn global() -> &'static SharedKeywordRegistry {
        static GLOBAL: OnceLock<SharedKeywordRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let registry = standard_keywords();
            tracing::debug!(keywords = registry.len(), "initialized global keyword registry");
            Self::from_registry(registry)
        })
    }

    /// See [`KeywordRegistry::register_keyword`].
    pub fn register_keyword<F>(&self, name: impl Into<String>, maker: F)
    where
        F: Fn() -> Box<dyn Keyword> + Send + Sync + 'static,
    {
        let maker: KeyMaker = Arc::new(maker);
        self.inner.lock().register_maker(name, maker);
    }

    /// See [`KeywordRegistry::set_keyword_order`].
    pub fn set_keyword_order(&self, name: impl Into<String>, order: i32) {
        self.inner.lock().set_keyword_order(name, order);
    }

    /// See [`KeywordRegistry::is_registered_keyword`].
    pub fn is_registered_keyword(&self, name: &str) -> bool {
        self.inner.lock().is_registered_keyword(name)
    }

    /// A fresh instance for `name`, constructed outside the lock.
    pub fn get_keyword(&self, name: &str) -> Box<dyn Keyword> {
        let maker = self.inner.lock().maker(name);
        match maker {
            Some(maker) => maker(),
            None => Void::boxed(),
        }
    }

    /// See [`KeywordRegistry::keyword_order`].
    pub fn keyword_order(&self, name: &str) -> i32 {
        self.inner.lock().keyword_order(name)
    }

    /// See [`KeywordRegistry::keyword_insert_order`].
    pub fn keyword_insert_order(&self, name: &str) -> usize {
        self.inner.lock().keyword_insert_order(name)
    }

    /// See [`KeywordRegistry::is_registry_loaded`].
    pub fn is_registry_loaded(&self) -> bool {
        self.inner.lock().is_registry_loaded()
    }

    /// Lock, copy, unlock. The copy is independent of the shared state.
    pub fn snapshot(&self) -> KeywordRegistry {
        self.inner.lock().copy()
    }
}

/// Register `name` in the process-wide registry.
pub fn register_keyword<F>(name: impl Into<String>, maker: F)
where
    F: Fn() -> Box<dyn Keyword> + Send + Sync + 'static,
{
    SharedKeywordRegistry::global().register_keyword(name, maker);
}

/// Set the priority of `name` in the process-wide registry.
pub fn set_keyword_order(name: impl Into<String>, order: i32) {
    SharedKeywordRegistry::global().set_keyword_order(name, order);
}

/// An independent copy of the process-wide registry.
pub fn copy_global_keyword_registry() -> KeywordRegistry {
    SharedKeywordRegistry::global().snapshot()
}
