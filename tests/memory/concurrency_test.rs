/*!
 * Concurrency Tests
 * Several threads sharing one registry
 */

use mempool_core::memory::PoolRegistry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_parallel_alloc_release() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "shared", 32);
    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&destroyed);
    registry.set_destructor(pool, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let registry = registry.clone();
            thread::spawn(move || {
                for i in 0..200usize {
                    let obj = registry.force_alloc(pool);
                    let tag = [worker as u8, (i % 256) as u8];
                    registry.write_bytes(obj, 0, &tag).expect("write tag");
                    registry.add_ref(obj);
                    assert_eq!(registry.read_bytes(obj, 0, 2).expect("read tag"), tag.to_vec());
                    registry.release(obj);
                    registry.release(obj);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let stats = registry.stats(pool);
    assert_eq!(stats.num_allocs, 1600);
    assert_eq!(stats.num_blocks_in_use, 0);
    assert!(stats.max_num_blocks_used <= 8);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1600);
}

#[test]
fn test_destructor_runs_without_lock() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "reentrant", 8);
    let other = registry.create_pool("Comp", "other", 8);

    // A destructor that touches the registry from another thread would deadlock
    // if the lock were held while it runs.
    registry.set_destructor(pool, move |registry, _| {
        let registry = registry.clone();
        thread::spawn(move || {
            let obj = registry.force_alloc(other);
            registry.release(obj);
        })
        .join()
        .expect("helper thread");
    });

    let obj = registry.force_alloc(pool);
    registry.release(obj);
    assert_eq!(registry.stats(other).num_allocs, 1);
}
