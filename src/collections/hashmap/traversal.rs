/*!
 * Map Traversal
 * Callback walks, borrowing iterators and stateless first/next lookups
 */

use super::types::{ForEachOutcome, MapError, MapResult};
use super::{NodeIndex, StepMap};

/// Borrowing iterator in bucket order
pub struct Iter<'a, K, V> {
    map: &'a StepMap<K, V>,
    bucket: usize,
    next: Option<NodeIndex>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = match self.next {
            Some(index) => index,
            None => {
                let (bucket, head) = self.map.first_from_bucket(self.bucket)?;
                self.bucket = bucket;
                head
            }
        };

        let node = self.map.node(index);
        self.next = node.next;
        if self.next.is_none() {
            self.bucket += 1;
        }
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a StepMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> StepMap<K, V> {
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            bucket: 0,
            next: None,
            remaining: self.len,
        }
    }

    /// Call `f` for every entry until it returns `false`
    ///
    /// Stopping on the very last entry still visits everything, which the
    /// outcome reports as `StoppedEarly { remaining: 0 }`.
    pub fn for_each<F>(&self, mut f: F) -> ForEachOutcome
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut visited = 0;
        for (key, value) in self.iter() {
            visited += 1;
            if !f(key, value) {
                return ForEachOutcome::StoppedEarly {
                    remaining: self.len - visited,
                };
            }
        }
        ForEachOutcome::Completed
    }

    /// First entry in bucket order
    pub fn first_node(&self) -> MapResult<(&K, &V)> {
        let (_, index) = self.first_from_bucket(0).ok_or(MapError::NotFound)?;
        let node = self.node(index);
        Ok((&node.key, &node.value))
    }

    /// Entry following `key` in bucket order
    ///
    /// `key` is looked up by hash on every call, so walking a whole map this way
    /// costs one bucket scan per step. Returns `MapError::BadParameter` if `key`
    /// is not in the map and `MapError::NotFound` if it is the last entry.
    pub fn node_after(&self, key: &K) -> MapResult<(&K, &V)> {
        if self.is_empty() {
            return Err(MapError::BadParameter);
        }
        let (bucket, found) = self.find(key);
        let index = found.ok_or(MapError::BadParameter)?;

        let next = match self.next_in_bucket(index) {
            Some(next) => next,
            None => self.first_from_bucket(bucket + 1).ok_or(MapError::NotFound)?.1,
        };
        let node = self.node(next);
        Ok((&node.key, &node.value))
    }
}
