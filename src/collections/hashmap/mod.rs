/*!
 * Step Map
 *
 * Fixed-bucket chained hash map whose entry nodes are accounted in a memory pool.
 *
 * ## Layout
 *
 * - Bucket count is a power of two chosen at creation and never changes, so the
 *   bucket index is `hash & (bucket_count - 1)`.
 * - Each bucket heads a doubly linked list of entries. New keys are appended.
 * - Every entry checks one word-sized block out of the map's entry sub-pool
 *   (`framework.hashMap_{name}`), carved from the shared `framework.hashMap`
 *   pool. The block is only an accounting token: the node itself lives in a slab
 *   indexed by the block's slot, so pool statistics count entries, not bytes.
 * - Dropping the map deletes its sub-pool, handing the blocks back to the
 *   shared pool for the next map.
 *
 * ## Traversal
 *
 * `for_each` and `iter` walk buckets in order. `first_node`/`node_after` are
 * stateless. `cursor` gives one exclusive step-by-step iterator that survives
 * removal of the entry it points at.
 */

mod bucket;
mod cursor;
mod hashing;
mod traversal;
mod types;

pub use cursor::Cursor;
pub use hashing::{secondary_mix, super_fast_hash, KeyHashing};
pub use traversal::Iter;
pub use types::{ForEachOutcome, MapError, MapResult};

use crate::core::limits::{
    FRAMEWORK_SCOPE, HASHMAP_ENTRY_BLOCK_SIZE, HASHMAP_POOL_NAME, HASHMAP_POOL_PREFIX,
    MIN_BUCKET_COUNT,
};
use crate::memory::{ObjectRef, PoolRegistry, SubPoolRef};
use bucket::Bucket;
use tracing::{debug, trace};

type NodeIndex = u32;

/// One key/value entry
struct Node<K, V> {
    key: K,
    value: V,
    block: ObjectRef,
    bucket: usize,
    prev: Option<NodeIndex>,
    next: Option<NodeIndex>,
}

/// Smallest power of two holding `capacity` entries at a 3/4 load factor
pub fn bucket_count_for(capacity: usize) -> usize {
    let target = capacity.saturating_mul(4) / 3;
    let mut buckets = MIN_BUCKET_COUNT;
    while buckets < target {
        buckets <<= 1;
    }
    buckets
}

/// Hash map with a fixed bucket array and pool-accounted entries
///
/// Not synchronized: wrap it in a lock to share it between threads.
pub struct StepMap<K, V> {
    name: String,
    registry: PoolRegistry,
    pool: SubPoolRef,
    hashing: KeyHashing<K>,
    buckets: Vec<Bucket>,
    nodes: Vec<Option<Node<K, V>>>,
    len: usize,
    trace: bool,
}

impl<K, V> StepMap<K, V> {
    /// Create a map sized for about `capacity` entries
    ///
    /// # Example
    ///
    /// ```rust
    /// use mempool_core::collections::{KeyHashing, StepMap};
    /// use mempool_core::memory::PoolRegistry;
    ///
    /// let registry = PoolRegistry::new();
    /// let mut map = StepMap::new(&registry, "sessions", 16, KeyHashing::string());
    /// map.put("alice".to_string(), 1);
    /// assert_eq!(map.get(&"alice".to_string()), Some(&1));
    /// ```
    pub fn new(registry: &PoolRegistry, name: &str, capacity: usize, hashing: KeyHashing<K>) -> Self {
        let bucket_count = bucket_count_for(capacity);

        let shared = registry.find_or_create_pool(
            FRAMEWORK_SCOPE,
            HASHMAP_POOL_NAME,
            HASHMAP_ENTRY_BLOCK_SIZE,
        );
        let pool_name = format!("{}{}", HASHMAP_POOL_PREFIX, name);
        let pool = registry.create_sub_pool(shared, FRAMEWORK_SCOPE, &pool_name, bucket_count / 2);
        registry.set_num_objs_to_force(pool, (bucket_count / 8).max(1));

        debug!(map = name, capacity, buckets = bucket_count, "Created hash map");

        Self {
            name: name.to_string(),
            registry: registry.clone(),
            pool,
            hashing,
            buckets: vec![Bucket::default(); bucket_count],
            nodes: Vec::new(),
            len: 0,
            trace: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sub-pool the entry blocks are allocated from
    ///
    /// Deleted when the map is dropped.
    pub fn entry_pool(&self) -> SubPoolRef {
        self.pool
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Same as `len`
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Emit `trace!` events for every operation on this map
    pub fn enable_trace(&mut self) {
        self.trace = true;
        trace!(map = %self.name, "Tracing enabled");
    }

    #[inline]
    fn bucket_index(&self, key: &K) -> usize {
        let hash = self.hashing.hash(key);
        let index = hash & (self.buckets.len() - 1);
        if self.trace {
            trace!(map = %self.name, hash, index, "Generated bucket index");
        }
        index
    }

    #[inline]
    fn node(&self, index: NodeIndex) -> &Node<K, V> {
        match self.nodes.get(index as usize).and_then(Option::as_ref) {
            Some(node) => node,
            None => fatal!("Hash map '{}' links to missing entry {}", self.name, index),
        }
    }

    #[inline]
    fn node_mut(&mut self, index: NodeIndex) -> &mut Node<K, V> {
        match self.nodes.get_mut(index as usize).and_then(Option::as_mut) {
            Some(node) => node,
            None => fatal!("Hash map '{}' links to missing entry {}", self.name, index),
        }
    }

    /// Entry holding `key`, with its bucket
    fn find(&self, key: &K) -> (usize, Option<NodeIndex>) {
        let bucket = self.bucket_index(key);
        let mut current = self.buckets[bucket].head;
        while let Some(index) = current {
            let node = self.node(index);
            if self.hashing.equals(&node.key, key) {
                return (bucket, Some(index));
            }
            current = node.next;
        }
        (bucket, None)
    }

    /// Insert or overwrite; returns the previous value
    ///
    /// On overwrite the stored key is kept and `key` is dropped.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let (bucket, found) = self.find(&key);

        if let Some(index) = found {
            if self.trace {
                trace!(map = %self.name, bucket, "Replaced value");
            }
            return Some(std::mem::replace(&mut self.node_mut(index).value, value));
        }

        let block = self.registry.force_alloc(self.pool);
        let index = block.slot();
        let slot = index as usize;
        if self.nodes.len() <= slot {
            self.nodes.resize_with(slot + 1, || None);
        }
        self.nodes[slot] = Some(Node {
            key,
            value,
            block,
            bucket,
            prev: None,
            next: None,
        });

        if self.buckets[bucket].is_empty() {
            self.push_front(bucket, index);
        } else {
            self.push_back(bucket, index);
        }
        self.len += 1;

        if self.trace {
            trace!(map = %self.name, bucket, len = self.len, "Inserted entry");
        }
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let (_, found) = self.find(key);
        found.map(|index| &self.node(index).value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (_, found) = self.find(key);
        match found {
            Some(index) => Some(&mut self.node_mut(index).value),
            None => None,
        }
    }

    /// The key as stored (first inserted of an equal set)
    pub fn get_stored_key(&self, key: &K) -> Option<&K> {
        let (_, found) = self.find(key);
        found.map(|index| &self.node(index).key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).1.is_some()
    }

    /// Remove a key; returns its value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove a key; returns the stored key and its value
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let (_, found) = self.find(key);
        found.map(|index| self.remove_node(index))
    }

    /// Unlink an entry and hand its block back to the pool
    fn remove_node(&mut self, index: NodeIndex) -> (K, V) {
        self.unlink(index);
        let node = match self.nodes[index as usize].take() {
            Some(node) => node,
            None => fatal!("Hash map '{}' links to missing entry {}", self.name, index),
        };
        self.registry.release(node.block);
        self.len -= 1;

        if self.trace {
            trace!(map = %self.name, bucket = node.bucket, len = self.len, "Removed entry");
        }
        (node.key, node.value)
    }

    /// Remove every entry, returning all blocks to the pool
    pub fn remove_all(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = Bucket::default();
        }
        for node in self.nodes.drain(..).flatten() {
            self.registry.release(node.block);
        }
        self.len = 0;

        if self.trace {
            trace!(map = %self.name, "Removed all entries");
        }
    }

    /// Entries beyond the first in each bucket
    pub fn count_collisions(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.len.saturating_sub(1))
            .sum()
    }
}

impl<K, V> Drop for StepMap<K, V> {
    fn drop(&mut self) {
        self.remove_all();
        self.registry.delete_sub_pool(self.pool);
    }
}

impl<K, V> std::fmt::Debug for StepMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepMap")
            .field("name", &self.name)
            .field("len", &self.len)
            .field("buckets", &self.buckets.len())
            .finish()
    }
}
