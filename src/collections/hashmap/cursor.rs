/*!
 * Step Cursor
 *
 * Explicit forward/backward stepping over a map. A cursor borrows its map
 * exclusively, so at most one step iteration is in flight and the map cannot
 * change underneath it except through the cursor itself.
 */

use super::types::{MapError, MapResult};
use super::{NodeIndex, StepMap};
use tracing::trace;

/// Step iterator over a `StepMap`
///
/// A fresh cursor sits before the first entry; call `next_node` to reach it.
///
/// # Example
///
/// ```rust
/// use mempool_core::collections::{KeyHashing, StepMap};
/// use mempool_core::memory::PoolRegistry;
///
/// let registry = PoolRegistry::new();
/// let mut map = StepMap::new(&registry, "jobs", 8, KeyHashing::uint32());
/// for id in 0..4u32 {
///     map.put(id, id % 2 == 0);
/// }
///
/// // Drop finished jobs while walking the map.
/// let mut cursor = map.cursor();
/// while cursor.next_node().is_ok() {
///     if cursor.value() == Some(&true) {
///         cursor.remove_current();
///     }
/// }
/// assert_eq!(map.len(), 2);
/// ```
pub struct Cursor<'a, K, V> {
    map: &'a mut StepMap<K, V>,
    bucket: usize,
    current: Option<NodeIndex>,
}

impl<K, V> StepMap<K, V> {
    /// Cursor positioned before the first entry
    pub fn cursor(&mut self) -> Cursor<'_, K, V> {
        Cursor {
            map: self,
            bucket: 0,
            current: None,
        }
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Advance to the next entry
    ///
    /// Returns `MapError::NotFound` once past the last entry (or at once on an
    /// empty map).
    pub fn next_node(&mut self) -> MapResult<()> {
        if self.map.is_empty() {
            return Err(MapError::NotFound);
        }
        let bucket_count = self.map.bucket_count();

        loop {
            if self.bucket >= bucket_count {
                return Err(MapError::NotFound);
            }

            self.current = match self.current {
                Some(index) => self.map.next_in_bucket(index),
                None => self.map.buckets[self.bucket].head,
            };

            if self.current.is_some() {
                if self.map.trace {
                    trace!(map = %self.map.name, bucket = self.bucket, "Cursor stepped forward");
                }
                return Ok(());
            }

            self.bucket += 1;
        }
    }

    /// Step back to the previous entry
    ///
    /// Returns `MapError::NotFound` when moving before the first entry (or at
    /// once on an empty map or a cursor that has not moved).
    pub fn prev_node(&mut self) -> MapResult<()> {
        if self.map.is_empty() || (self.bucket == 0 && self.current.is_none()) {
            return Err(MapError::NotFound);
        }

        let bucket_count = self.map.bucket_count();
        if self.bucket >= bucket_count {
            self.bucket = bucket_count - 1;
        }

        loop {
            self.current = match self.current {
                Some(index) => self.map.prev_in_bucket(index),
                None => self.map.buckets[self.bucket].tail,
            };

            if self.current.is_some() {
                if self.map.trace {
                    trace!(map = %self.map.name, bucket = self.bucket, "Cursor stepped back");
                }
                return Ok(());
            }

            if self.bucket == 0 {
                return Err(MapError::NotFound);
            }
            self.bucket -= 1;
        }
    }

    /// Key at the cursor, if it points at an entry
    pub fn key(&self) -> Option<&K> {
        self.current.map(|index| &self.map.node(index).key)
    }

    /// Value at the cursor, if it points at an entry
    pub fn value(&self) -> Option<&V> {
        self.current.map(|index| &self.map.node(index).value)
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        match self.current {
            Some(index) => Some(&mut self.map.node_mut(index).value),
            None => None,
        }
    }

    /// Key and value at the cursor
    pub fn entry(&self) -> Option<(&K, &V)> {
        self.current.map(|index| {
            let node = self.map.node(index);
            (&node.key, &node.value)
        })
    }

    /// Move back to the position before the first entry
    pub fn reset(&mut self) {
        self.bucket = 0;
        self.current = None;
    }

    /// Remove a key from the map
    ///
    /// If the cursor points at that entry it first steps back, so that
    /// `next_node` continues with the entry after the removed one.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (_, found) = self.map.find(key);
        let index = found?;
        if self.current == Some(index) {
            let _ = self.prev_node();
        }
        Some(self.map.remove_node(index).1)
    }

    /// Remove the entry at the cursor, stepping back first
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let index = self.current?;
        let _ = self.prev_node();
        Some(self.map.remove_node(index))
    }
}
