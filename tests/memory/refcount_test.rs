/*!
 * Reference Counting Tests
 * Destructor timing, guards and fatal misuse
 */

use mempool_core::memory::{ObjectRef, PoolGuardExt, PoolRegistry};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_pool(registry: &PoolRegistry) -> (mempool_core::PoolRef, Arc<AtomicUsize>) {
    let pool = registry.create_pool("Comp", "counted", 16);
    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&destroyed);
    registry.set_destructor(pool, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (pool, destroyed)
}

#[test]
fn test_destructor_runs_after_matching_releases() {
    let registry = PoolRegistry::new();
    let (pool, destroyed) = counting_pool(&registry);

    let obj = registry.force_alloc(pool);
    for _ in 0..3 {
        registry.add_ref(obj);
    }
    assert_eq!(registry.ref_count(obj), 4);

    for remaining in (1..4).rev() {
        registry.release(obj);
        assert_eq!(registry.ref_count(obj), remaining);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }

    registry.release(obj);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    assert_eq!(registry.stats(pool).num_blocks_in_use, 0);
}

#[test]
fn test_destructor_releases_nested_objects() {
    let registry = PoolRegistry::new();
    let parents = registry.create_pool("Comp", "parents", 8);
    let children = registry.create_pool("Comp", "children", 8);
    let links: Arc<Mutex<Vec<(ObjectRef, ObjectRef)>>> = Arc::new(Mutex::new(Vec::new()));

    let table = Arc::clone(&links);
    registry.set_destructor(parents, move |registry, parent| {
        let child = {
            let mut table = table.lock();
            let position = table
                .iter()
                .position(|(p, _)| *p == parent)
                .expect("parent registered");
            table.remove(position).1
        };
        registry.release(child);
    });

    for _ in 0..4 {
        let parent = registry.force_alloc(parents);
        let child = registry.force_alloc(children);
        links.lock().push((parent, child));
    }

    let parents_alive: Vec<ObjectRef> = links.lock().iter().map(|(p, _)| *p).collect();
    for parent in parents_alive {
        registry.release(parent);
    }

    assert!(links.lock().is_empty());
    assert_eq!(registry.stats(children).num_blocks_in_use, 0);
    assert_eq!(registry.stats(parents).num_blocks_in_use, 0);
}

#[test]
fn test_guards_balance_references() {
    let registry = PoolRegistry::new();
    let (pool, destroyed) = counting_pool(&registry);

    let guard = registry.force_alloc_guard(pool);
    let copies: Vec<_> = (0..5).map(|_| guard.clone()).collect();
    assert_eq!(guard.ref_count(), 6);

    drop(copies);
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    drop(guard);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
#[should_panic(expected = "Free block")]
fn test_release_twice_is_fatal() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "twice", 8);
    let obj = registry.force_alloc(pool);

    registry.release(obj);
    registry.release(obj);
}

#[test]
#[should_panic(expected = "released object")]
fn test_add_ref_on_dead_object_is_fatal() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "dead", 8);
    let obj = registry.force_alloc(pool);

    registry.release(obj);
    registry.add_ref(obj);
}

#[test]
#[should_panic(expected = "is exhausted")]
fn test_assert_alloc_guard_on_empty_pool_is_fatal() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "empty", 8);
    let _guard = registry.assert_alloc_guard(pool);
}
