/// Memory and reference-count tests
///
/// Cached instances are plain `Arc`s held by the registry. Removing or
/// clearing an entry must release the container's reference.

use ferrous_container::{Concrete, Container, DiError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static DROPS: AtomicUsize = AtomicUsize::new(0);

struct Tracked;

impl Drop for Tracked {
    fn drop(&mut self) {
        DROPS.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_cached_instance_released_by_remove_and_clear() {
    let container = Container::new();
    container.singleton("tracked", |_| Tracked);

    let instance = container.get("tracked").unwrap();
    assert_eq!(Arc::strong_count(&instance), 2);

    container.remove("tracked");
    assert_eq!(Arc::strong_count(&instance), 1);

    let before = DROPS.load(Ordering::SeqCst);
    drop(instance);
    assert_eq!(DROPS.load(Ordering::SeqCst), before + 1);

    container.instance("value", String::from("v"));
    let value = container.get("value").unwrap();
    container.clear();
    assert_eq!(Arc::strong_count(&value), 1);
}

#[test]
fn test_transient_instances_are_not_retained() {
    let container = Container::new();
    container.transient("fresh", |_| String::from("f"));

    let instance = container.get("fresh").unwrap();
    assert_eq!(Arc::strong_count(&instance), 1);
}

#[test]
fn test_failed_resolution_caches_nothing() {
    let container = Container::new();
    container.register(
        "broken",
        Concrete::Factory(Arc::new(|c: &Container| c.get("missing"))),
        true,
    );

    assert_eq!(container.get("broken").unwrap_err(), DiError::NotFound("missing".into()));
    assert!(container.service_descriptors().iter().all(|d| !d.instantiated));
}

#[test]
fn test_clones_do_not_duplicate_cache() {
    let container = Container::new();
    container.singleton("shared", |_| vec![0u8; 1024]);

    let clones: Vec<Container> = (0..10).map(|_| container.clone()).collect();
    let first = container.get("shared").unwrap();
    for clone in &clones {
        assert!(Arc::ptr_eq(&first, &clone.get("shared").unwrap()));
    }
    // One reference in the cache, one held here.
    assert_eq!(Arc::strong_count(&first), 2);
}
