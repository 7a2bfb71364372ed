/*!
 * Hash Map Property Tests
 * Random operation sequences checked against std's HashMap
 */

use mempool_core::collections::{KeyHashing, StepMap};
use mempool_core::memory::PoolRegistry;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum MapOp {
    Put(u32, u32),
    Remove(u32),
    Get(u32),
}

fn map_op() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        (0u32..64, any::<u32>()).prop_map(|(k, v)| MapOp::Put(k, v)),
        (0u32..64).prop_map(MapOp::Remove),
        (0u32..64).prop_map(MapOp::Get),
    ]
}

proptest! {
    #[test]
    fn prop_matches_std_hashmap(ops in prop::collection::vec(map_op(), 1..200), capacity in 0usize..64) {
        let registry = PoolRegistry::new();
        let mut map = StepMap::new(&registry, "prop", capacity, KeyHashing::uint32());
        let mut model = HashMap::new();

        for op in ops {
            match op {
                MapOp::Put(k, v) => prop_assert_eq!(map.put(k, v), model.insert(k, v)),
                MapOp::Remove(k) => prop_assert_eq!(map.remove(&k), model.remove(&k)),
                MapOp::Get(k) => prop_assert_eq!(map.get(&k), model.get(&k)),
            }
            prop_assert_eq!(map.len(), model.len());
        }

        let stats = registry.stats(map.entry_pool());
        prop_assert_eq!(stats.num_blocks_in_use, model.len());

        let mut keys: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        let mut expected: Vec<u32> = model.keys().copied().collect();
        expected.sort_unstable();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn prop_cursor_removal_visits_all(keys in prop::collection::hash_set(any::<u32>(), 0..100), modulus in 1u32..5) {
        let registry = PoolRegistry::new();
        let mut map = StepMap::new(&registry, "prop_cursor", 16, KeyHashing::uint32());
        for key in &keys {
            map.put(*key, ());
        }

        let mut visited = 0;
        let mut cursor = map.cursor();
        while cursor.next_node().is_ok() {
            visited += 1;
            let key = *cursor.key().expect("cursor on an entry");
            if key % modulus == 0 {
                cursor.remove_current();
            }
        }

        prop_assert_eq!(visited, keys.len());
        let survivors = keys.iter().filter(|k| *k % modulus != 0).count();
        prop_assert_eq!(map.len(), survivors);
    }
}
