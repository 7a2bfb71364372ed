/*!
 * Pool Tests
 * Creation, growth, statistics and lookup through the public API
 */

use mempool_core::memory::{AnyPool, PoolConfig, PoolKind, PoolRegistry};
use mempool_core::RegistrySnapshot;
use pretty_assertions::assert_eq;

#[test]
fn test_force_alloc_on_empty_pool_overflows_each_time() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "P", 16);

    let objects: Vec<_> = (0..5).map(|_| registry.force_alloc(pool)).collect();

    let stats = registry.stats(pool);
    assert_eq!(stats.num_overflows, 5);
    assert_eq!(stats.num_allocs, 5);
    assert_eq!(stats.num_blocks_in_use, 5);
    assert_eq!(registry.object_count(pool), 5);

    for obj in objects {
        registry.release(obj);
    }
    assert_eq!(registry.stats(pool).num_free, 5);
}

#[test]
fn test_pre_expanded_pool_never_overflows() {
    let registry = PoolRegistry::new();
    let pool = registry.expand(registry.create_pool("Comp", "sized", 32), 10);

    let objects: Vec<_> = (0..10).map(|_| registry.force_alloc(pool)).collect();
    assert_eq!(registry.stats(pool).num_overflows, 0);
    assert!(registry.try_alloc(pool).is_none());

    for obj in objects {
        registry.release(obj);
    }
}

#[test]
fn test_block_size_includes_guards() {
    let guarded = PoolRegistry::new();
    let unguarded = PoolRegistry::with_config(PoolConfig::unguarded());

    let a = guarded.create_pool("Comp", "g", 16);
    let b = unguarded.create_pool("Comp", "u", 16);

    let word = std::mem::size_of::<usize>();
    assert_eq!(unguarded.object_full_size(b), 2 * word + 16);
    assert_eq!(guarded.object_full_size(a), 2 * word + 16 + 2 * 32);
}

#[test]
fn test_name_is_scoped_and_truncated() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "P", 8);
    assert_eq!(registry.name(pool), "Comp.P");

    let long = "x".repeat(100);
    let truncated = registry.create_pool("Comp", &long, 8);
    assert_eq!(registry.name(truncated).len(), 80);

    // Lookups truncate the same way.
    assert_eq!(
        registry.find_pool("Comp", &long),
        Some(AnyPool::Pool(truncated))
    );
}

#[test]
fn test_duplicate_names_are_tolerated() {
    let registry = PoolRegistry::new();
    let first = registry.create_pool("Comp", "same", 8);
    let second = registry.create_pool("Comp", "same", 8);

    assert_ne!(first, second);
    assert_eq!(registry.find_pool("Comp", "same"), Some(AnyPool::Pool(first)));
}

#[test]
fn test_payload_round_trip_and_reuse() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "payload", 24);

    let obj = registry.force_alloc(pool);
    registry
        .write_bytes(obj, 0, b"hello pool")
        .expect("write inside object");
    assert_eq!(
        registry.read_bytes(obj, 0, 10).expect("read inside object"),
        b"hello pool".to_vec()
    );
    registry.release(obj);

    assert!(registry.read_bytes(obj, 0, 1).is_err());
}

#[test]
fn test_pools_listing_and_snapshot() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("Comp", "listed", 8);
    registry.expand(pool, 3);
    let obj = registry.force_alloc(pool);

    let snapshot = RegistrySnapshot::capture(&registry);
    let info = snapshot
        .pools
        .iter()
        .find(|info| info.name == "Comp.listed")
        .expect("pool listed");

    assert_eq!(info.kind, PoolKind::TopLevel);
    assert_eq!(info.total_blocks, 3);
    assert_eq!(info.stats.num_blocks_in_use, 1);
    assert!(snapshot.to_json().expect("serializable").contains("Comp.listed"));

    registry.release(obj);
}
