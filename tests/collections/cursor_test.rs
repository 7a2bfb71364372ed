/*!
 * Cursor Tests
 * Stepping, removal during iteration and stateless walks
 */

use mempool_core::collections::{KeyHashing, MapError, StepMap};
use mempool_core::memory::PoolRegistry;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn names(registry: &PoolRegistry, count: usize) -> StepMap<String, usize> {
    let mut map = StepMap::new(registry, "names", count, KeyHashing::string());
    for i in 0..count {
        map.put(format!("name-{}", i), i);
    }
    map
}

#[test]
fn test_remove_under_iteration_visits_each_once() {
    let registry = PoolRegistry::new();
    let mut map = names(&registry, 40);

    let mut seen = HashSet::new();
    let mut removed = 0;
    let mut cursor = map.cursor();
    while cursor.next_node().is_ok() {
        let (key, value) = cursor.entry().expect("cursor on an entry");
        assert!(seen.insert(key.clone()), "visited {} twice", key);
        if value % 2 == 1 {
            cursor.remove_current().expect("entry removed");
            removed += 1;
        }
    }

    assert_eq!(seen.len(), 40);
    assert_eq!(removed, 20);
    assert_eq!(map.len(), 20);
    assert!(map.iter().all(|(_, v)| v % 2 == 0));
}

#[test]
fn test_remove_by_key_at_cursor() {
    let registry = PoolRegistry::new();
    let mut map = names(&registry, 8);

    let mut visited = 0;
    let mut cursor = map.cursor();
    while cursor.next_node().is_ok() {
        visited += 1;
        let key = cursor.key().expect("cursor on an entry").clone();
        assert!(cursor.remove(&key).is_some());
    }

    assert_eq!(visited, 8);
    assert!(map.is_empty());
    assert_eq!(registry.stats(map.entry_pool()).num_blocks_in_use, 0);
}

#[test]
fn test_prev_at_start_and_end() {
    let registry = PoolRegistry::new();
    let mut map = names(&registry, 3);
    let mut cursor = map.cursor();

    assert_eq!(cursor.prev_node(), Err(MapError::NotFound));
    cursor.next_node().expect("first entry");
    let first = cursor.key().cloned();
    assert_eq!(cursor.prev_node(), Err(MapError::NotFound));

    cursor.reset();
    while cursor.next_node().is_ok() {}
    cursor.prev_node().expect("last entry");
    let last = cursor.key().cloned();

    assert!(first.is_some());
    assert!(last.is_some());
    assert_ne!(first, last);
}

#[test]
fn test_value_mut_through_cursor() {
    let registry = PoolRegistry::new();
    let mut map = names(&registry, 5);

    let mut cursor = map.cursor();
    while cursor.next_node().is_ok() {
        if let Some(value) = cursor.value_mut() {
            *value *= 10;
        }
    }

    assert_eq!(map.get(&"name-4".to_string()), Some(&40));
}

#[test]
fn test_stateless_walk() {
    let registry = PoolRegistry::new();
    let map = names(&registry, 12);

    let mut walked = HashSet::new();
    let mut current = map.first_node().map(|(k, _)| k.clone());
    while let Ok(key) = current {
        assert!(walked.insert(key.clone()));
        current = map.node_after(&key).map(|(k, _)| k.clone());
    }

    assert_eq!(current, Err(MapError::NotFound));
    assert_eq!(walked.len(), 12);
    assert_eq!(
        map.node_after(&"stranger".to_string()),
        Err(MapError::BadParameter)
    );
}
