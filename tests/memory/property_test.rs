/*!
 * Property Tests
 * Accounting and reference-count invariants under random operation sequences
 */

use mempool_core::memory::{ObjectRef, PoolRegistry};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Alloc,
    AddRef(usize),
    Release(usize),
    Expand(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Alloc),
        2 => any::<usize>().prop_map(Op::AddRef),
        4 => any::<usize>().prop_map(Op::Release),
        1 => (0usize..4).prop_map(Op::Expand),
    ]
}

proptest! {
    #[test]
    fn prop_accounting_holds_after_every_op(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let registry = PoolRegistry::new();
        let pool = registry.create_pool("prop", "acct", 16);
        let destroyed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&destroyed);
        registry.set_destructor(pool, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // (object, references held)
        let mut live: Vec<(ObjectRef, usize)> = Vec::new();
        let mut allocated = 0usize;

        for op in ops {
            match op {
                Op::Alloc => {
                    live.push((registry.force_alloc(pool), 1));
                    allocated += 1;
                }
                Op::AddRef(i) if !live.is_empty() => {
                    let i = i % live.len();
                    registry.add_ref(live[i].0);
                    live[i].1 += 1;
                }
                Op::Release(i) if !live.is_empty() => {
                    let i = i % live.len();
                    registry.release(live[i].0);
                    live[i].1 -= 1;
                    if live[i].1 == 0 {
                        live.swap_remove(i);
                    }
                }
                Op::Expand(n) => {
                    registry.expand(pool, n);
                }
                _ => {}
            }

            let stats = registry.stats(pool);
            prop_assert_eq!(stats.num_free + stats.num_blocks_in_use, registry.object_count(pool));
            prop_assert_eq!(stats.num_blocks_in_use, live.len());
            prop_assert_eq!(destroyed.load(Ordering::SeqCst), allocated - live.len());
            for (obj, refs) in &live {
                prop_assert_eq!(registry.ref_count(*obj), *refs);
            }
        }
    }

    #[test]
    fn prop_sub_pool_round_trip(initial in 0usize..20, lent in 0usize..30, used in 0usize..10) {
        let registry = PoolRegistry::new();
        let pool = registry.create_pool("prop", "super", 8);
        registry.expand(pool, initial);

        let sub = registry.create_sub_pool(pool, "prop", "sub", lent);
        let total_after_lend = registry.object_count(pool);
        prop_assert_eq!(total_after_lend, initial.max(lent));
        prop_assert_eq!(registry.stats(pool).num_blocks_in_use, lent);

        let objects: Vec<_> = (0..used).map(|_| registry.force_alloc(sub)).collect();
        for obj in objects {
            registry.release(obj);
        }

        let sub_total = registry.object_count(sub);
        registry.delete_sub_pool(sub);

        let stats = registry.stats(pool);
        prop_assert_eq!(stats.num_blocks_in_use, 0);
        prop_assert_eq!(stats.num_free, registry.object_count(pool));
        prop_assert_eq!(registry.object_count(pool), initial.max(sub_total));
    }
}

#[test]
fn test_random_release_order_destroys_each_object_once() {
    let registry = PoolRegistry::new();
    let pool = registry.create_pool("prop", "shuffle", 8);
    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&destroyed);
    registry.set_destructor(pool, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut references = Vec::new();
    for i in 0..50 {
        let obj = registry.force_alloc(pool);
        references.push(obj);
        for _ in 0..(i % 4) {
            registry.add_ref(obj);
            references.push(obj);
        }
    }

    let mut rng = StdRng::seed_from_u64(0x5EED);
    references.shuffle(&mut rng);
    for obj in references {
        registry.release(obj);
    }

    assert_eq!(destroyed.load(Ordering::SeqCst), 50);
    assert_eq!(registry.stats(pool).num_blocks_in_use, 0);
}
