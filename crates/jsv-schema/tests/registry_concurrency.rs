//! # Keyword Registry Under Concurrency
//!
//! Registration, ordering and lookups issued from many threads against
//! one [`SharedKeywordRegistry`], and the process-wide default.

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use jsv_core::{Pointer, RunContext};
use jsv_schema::keywords::Annotation;
use jsv_schema::{
    copy_global_keyword_registry, register_keyword, set_keyword_order, Keyword,
    SharedKeywordRegistry, ValidationState, DEFAULT_INSERT_ORDER,
};
use serde_json::json;

fn annotation() -> Box<dyn Keyword> {
    Box::new(Annotation::default())
}

#[test]
fn concurrent_registration_assigns_unique_dense_insert_orders() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 25;

    let shared = SharedKeywordRegistry::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let shared = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    shared.register_keyword(format!("kw-{t}-{i}"), annotation);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = shared.snapshot();
    let total = THREADS * PER_THREAD;
    assert_eq!(snapshot.len(), total);

    let orders: BTreeSet<usize> = snapshot
        .keyword_names()
        .into_iter()
        .map(|name| snapshot.keyword_insert_order(name))
        .collect();
    assert_eq!(orders, (0..total).collect::<BTreeSet<_>>());
}

#[test]
fn concurrent_reregistration_keeps_first_insert_order() {
    let shared = SharedKeywordRegistry::new();
    shared.register_keyword("a", annotation);
    shared.register_keyword("b", annotation);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    shared.register_keyword("a", annotation);
                    shared.set_keyword_order("b", 0);
                    assert!(!shared.get_keyword("a").is_void());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.keyword_insert_order("a"), 0);
    assert_eq!(shared.keyword_insert_order("b"), 1);
    assert_eq!(shared.keyword_order("b"), 0);
    assert_eq!(shared.snapshot().keyword_names(), ["b", "a"]);
}

#[test]
fn factory_may_reenter_the_registry() {
    // The factory runs outside the lock, so it may call back in.
    let shared = SharedKeywordRegistry::new();
    let inner = shared.clone();
    shared.register_keyword("outer", move || {
        assert!(inner.is_registered_keyword("outer"));
        annotation()
    });
    assert!(!shared.get_keyword("outer").is_void());
}

#[test]
fn snapshot_is_independent_of_shared_state() {
    let shared = SharedKeywordRegistry::new();
    shared.register_keyword("a", annotation);
    let mut copy = shared.snapshot();

    copy.register_keyword("b", annotation);
    shared.set_keyword_order("a", 7);

    assert!(!shared.is_registered_keyword("b"));
    assert_eq!(copy.keyword_order("a"), 1);
    assert_eq!(shared.keyword_order("a"), 7);
}

#[test]
fn global_registry_is_preloaded() {
    let global = SharedKeywordRegistry::global();
    assert!(global.is_registry_loaded());
    for name in ["type", "properties", "additionalProperties", "$ref", "oneOf"] {
        assert!(global.is_registered_keyword(name), "{name} missing");
    }
    assert_eq!(global.keyword_insert_order("x-never"), DEFAULT_INSERT_ORDER);

    let copy = copy_global_keyword_registry();
    assert_eq!(copy.keyword_order("properties"), 2);
    assert_eq!(copy.keyword_order("additionalProperties"), 3);
}

#[test]
fn process_wide_free_functions_register_concurrently() {
    const THREADS: usize = 8;

    let before = copy_global_keyword_registry();
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                register_keyword(format!("x-global-free-{t}"), annotation);
                set_keyword_order(format!("x-global-free-{t}"), 10 + t as i32);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let after = copy_global_keyword_registry();
    let mut fresh: BTreeSet<usize> = BTreeSet::new();
    for t in 0..THREADS {
        let name = format!("x-global-free-{t}");
        assert!(!before.is_registered_keyword(&name));
        assert!(after.is_registered_keyword(&name));
        assert_eq!(after.keyword_order(&name), 10 + t as i32);
        fresh.insert(after.keyword_insert_order(&name));
    }

    // The new names took distinct ranks after every name already present.
    assert_eq!(fresh.len(), THREADS);
    assert!(fresh.iter().all(|&rank| rank >= before.len()));
    assert_eq!(after.keyword_order("properties"), 2);
    assert_eq!(
        after.keyword_insert_order("type"),
        before.keyword_insert_order("type")
    );
}

#[test]
fn unknown_keyword_from_shared_registry_is_inert() {
    let kw = SharedKeywordRegistry::new().get_keyword("nope");
    assert!(kw.is_void());

    let mut state = ValidationState::standalone();
    for data in [json!(null), json!({"a": [1]}), json!("s")] {
        kw.validate_keyword(&RunContext::background(), &mut state, &data);
    }
    assert!(state.is_valid());
    assert!(kw.resolve(&Pointer::parse("/x").unwrap(), "s").schema().is_none());
}
