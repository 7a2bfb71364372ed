/*!
 * Pool Registry
 *
 * Fixed-size block pools with reference counting, destructors and sub-pools.
 *
 * ## Model
 *
 * - A **pool** hands out blocks of one size. Blocks are created in bulk when the
 *   pool grows and are never returned to the system allocator.
 * - A **sub-pool** borrows blocks from a top-level **super-pool**. The super-pool
 *   counts lent blocks as in use. Deleting a sub-pool (only possible while none of
 *   its blocks are live) hands every block back.
 * - Blocks are reference counted. The final release runs the pool's destructor
 *   with the registry lock released, then pushes the block onto its free list.
 *
 * ## Locking
 *
 * One coarse `parking_lot::Mutex` guards all pool metadata, free lists and block
 * headers. It is held only for O(1) bookkeeping and chunk allocation, never while
 * a destructor runs, so destructors may allocate and release freely.
 */

mod allocator;
mod block;
mod expand;
mod free_list;
mod introspection;
mod storage;
mod sub_pool;

pub(crate) use block::BlockLayout;

use super::config::PoolConfig;
use super::handle::{ObjectRef, PoolId, PoolRef};
use super::types::{Destructor, PoolKind};
use crate::core::limits::{FRAMEWORK_SCOPE, SUB_POOLS_POOL_NAME};
use crate::core::types::Size;
use block::{BlockArena, Slot};
use free_list::FreeList;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Metadata of one pool
pub(crate) struct PoolState {
    pub name: String,
    pub layout: BlockLayout,
    pub kind: PoolKind,
    pub destructor: Option<Destructor>,
    pub free_list: FreeList,
    pub total_blocks: usize,
    pub in_use: usize,
    pub num_allocs: usize,
    pub num_overflows: usize,
    pub max_used: usize,
    pub blocks_to_force: usize,
    /// Block storage; top-level pools only
    pub arena: Option<BlockArena>,
    /// Block checked out of the sub-pools pool; sub-pools only
    pub metadata_block: Option<ObjectRef>,
}

impl PoolState {
    #[inline]
    fn note_in_use(&mut self) {
        if self.in_use > self.max_used {
            self.max_used = self.in_use;
        }
    }
}

struct PoolEntry {
    generation: u32,
    state: Option<PoolState>,
}

/// Everything behind the registry lock
pub(crate) struct RegistryInner {
    pools: Vec<PoolEntry>,
    free_ids: Vec<u32>,
    /// Registration order, for lookups and introspection
    order: Vec<PoolId>,
    change_count: usize,
}

impl RegistryInner {
    fn new() -> Self {
        Self {
            pools: Vec::new(),
            free_ids: Vec::new(),
            order: Vec::new(),
            change_count: 0,
        }
    }

    fn lookup(&self, id: PoolId) -> Option<&PoolState> {
        self.pools
            .get(id.slot())
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.state.as_ref())
    }

    pub fn pool(&self, id: PoolId) -> &PoolState {
        match self.lookup(id) {
            Some(state) => state,
            None => fatal!("Unknown memory pool {}", id),
        }
    }

    pub fn pool_mut(&mut self, id: PoolId) -> &mut PoolState {
        let entry = self
            .pools
            .get_mut(id.slot())
            .filter(|entry| entry.generation == id.generation);
        match entry.and_then(|entry| entry.state.as_mut()) {
            Some(state) => state,
            None => fatal!("Unknown memory pool {}", id),
        }
    }

    /// The top-level pool whose arena holds this pool's blocks
    pub fn arena_owner(&self, id: PoolId) -> PoolId {
        match self.pool(id).kind {
            PoolKind::TopLevel => id,
            PoolKind::SubPoolOf(super_pool) => super_pool.0,
        }
    }

    pub fn arena(&self, arena_id: PoolId) -> &BlockArena {
        match self.pool(arena_id).arena.as_ref() {
            Some(arena) => arena,
            None => fatal!("Memory pool {} owns no block storage", arena_id),
        }
    }

    pub fn arena_mut(&mut self, arena_id: PoolId) -> &mut BlockArena {
        match self.pool_mut(arena_id).arena.as_mut() {
            Some(arena) => arena,
            None => fatal!("Memory pool {} owns no block storage", arena_id),
        }
    }

    /// Slot header for a handle whose generation still matches, if any
    pub fn live_slot(&self, obj: ObjectRef) -> Option<&Slot> {
        self.lookup(obj.arena)
            .and_then(|state| state.arena.as_ref())
            .and_then(|arena| arena.slot(obj.slot))
            .filter(|slot| slot.generation == obj.generation)
    }

    /// Slot header for a handle, halting on stale or foreign handles
    pub fn slot_mut(&mut self, obj: ObjectRef) -> &mut Slot {
        let slot = self
            .arena_mut(obj.arena)
            .slot_mut(obj.slot)
            .filter(|slot| slot.generation == obj.generation);
        match slot {
            Some(slot) => slot,
            None => fatal!("Stale or foreign object reference {}", obj),
        }
    }

    /// Halt if either guard band of the object's block was overwritten
    pub fn verify_guards(&self, obj: ObjectRef) {
        if let Err(violation) = self.arena(obj.arena).check_guards(obj.slot) {
            let owner = self
                .arena(obj.arena)
                .slot(obj.slot)
                .map(|slot| slot.owner)
                .unwrap_or(obj.arena);
            fatal!(
                "Memory corruption detected {} object {} from pool '{}': guard word at byte {} should be {:#010x} but is {:#010x}",
                violation.position(),
                obj,
                self.pool(owner).name,
                violation.word_offset,
                crate::core::limits::GUARD_WORD,
                violation.found
            );
        }
    }

    fn create_pool(
        &mut self,
        config: &PoolConfig,
        scope: &str,
        name: &str,
        layout: BlockLayout,
        kind: PoolKind,
    ) -> PoolId {
        let full_name = scoped_name(scope, name, config.max_pool_name_bytes);

        let arena = match kind {
            PoolKind::TopLevel => Some(BlockArena::new(layout)),
            PoolKind::SubPoolOf(_) => None,
        };
        let state = PoolState {
            name: full_name,
            layout,
            kind,
            destructor: None,
            free_list: FreeList::new(),
            total_blocks: 0,
            in_use: 0,
            num_allocs: 0,
            num_overflows: 0,
            max_used: 0,
            blocks_to_force: config.default_blocks_to_force.max(1),
            arena,
            metadata_block: None,
        };

        let id = match self.free_ids.pop() {
            Some(index) => {
                let entry = &mut self.pools[index as usize];
                entry.state = Some(state);
                PoolId::new(index, entry.generation)
            }
            None => {
                let index = self.pools.len() as u32;
                self.pools.push(PoolEntry {
                    generation: 0,
                    state: Some(state),
                });
                PoolId::new(index, 0)
            }
        };

        self.warn_if_name_taken(id);
        self.order.push(id);
        self.change_count += 1;
        id
    }

    /// Pool names should be unique; duplicates are tolerated but reported
    fn warn_if_name_taken(&self, id: PoolId) {
        let name = &self.pool(id).name;
        let taken = self
            .order
            .iter()
            .any(|other| *other != id && self.pool(*other).name == *name);
        if taken {
            warn!(
                pool = %name,
                "Multiple memory pools share the same name. This will become illegal in future releases."
            );
        }
    }

    /// Drop a pool's metadata and invalidate every handle to it
    fn retire_pool(&mut self, id: PoolId) -> PoolState {
        let entry = &mut self.pools[id.slot()];
        let state = match entry.state.take() {
            Some(state) => state,
            None => fatal!("Unknown memory pool {}", id),
        };
        entry.generation = entry.generation.wrapping_add(1);
        self.free_ids.push(id.index);
        self.order.retain(|other| *other != id);
        self.change_count += 1;
        state
    }
}

/// Build "scope.name", truncated on a character boundary
fn scoped_name(scope: &str, name: &str, max_bytes: usize) -> String {
    let mut full = format!("{}.{}", scope, name);
    if full.len() > max_bytes {
        let mut cut = max_bytes;
        while !full.is_char_boundary(cut) {
            cut -= 1;
        }
        full.truncate(cut);
        debug!(scope, name, truncated = %full, "Memory pool name truncated");
    }
    full
}

/// Registry of all pools in one context
///
/// Cheap to clone: clones share the same pools and lock.
#[derive(Clone)]
pub struct PoolRegistry {
    pub(super) inner: Arc<Mutex<RegistryInner>>,
    config: Arc<PoolConfig>,
    sub_pools_pool: PoolRef,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a registry with custom layout settings
    pub fn with_config(config: PoolConfig) -> Self {
        let mut inner = RegistryInner::new();

        let layout = BlockLayout::new(std::mem::size_of::<PoolState>(), config.guard_band_words);
        let sub_pools = inner.create_pool(
            &config,
            FRAMEWORK_SCOPE,
            SUB_POOLS_POOL_NAME,
            layout,
            PoolKind::TopLevel,
        );
        inner.expand(sub_pools, config.sub_pools_pool_size);

        info!(
            guard_band_words = config.guard_band_words,
            sub_pools = config.sub_pools_pool_size,
            "Pool registry initialized"
        );

        Self {
            inner: Arc::new(Mutex::new(inner)),
            config: Arc::new(config),
            sub_pools_pool: PoolRef(sub_pools),
        }
    }

    /// Registry configured from `MEMPOOL_*` environment variables
    pub fn from_env() -> Self {
        Self::with_config(PoolConfig::from_env())
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Internal pool that sub-pool metadata is checked out of
    pub fn sub_pools_pool(&self) -> PoolRef {
        self.sub_pools_pool
    }

    /// Create a top-level pool of `object_size`-byte objects
    ///
    /// The pool starts empty; grow it with `expand` or let `force_alloc` grow it.
    pub fn create_pool(&self, scope: &str, name: &str, object_size: Size) -> PoolRef {
        let layout = BlockLayout::new(object_size, self.config.guard_band_words);
        let mut inner = self.inner.lock();
        let id = inner.create_pool(&self.config, scope, name, layout, PoolKind::TopLevel);

        debug!(
            pool = %inner.pool(id).name,
            object_size,
            block_size = layout.block_size,
            "Created memory pool"
        );
        PoolRef(id)
    }

    /// Top-level pool named `scope.name` with `object_size`-byte objects, created if missing
    ///
    /// Lookup and creation happen under one lock, so concurrent callers asking for
    /// the same shared pool get the same handle.
    pub fn find_or_create_pool(&self, scope: &str, name: &str, object_size: Size) -> PoolRef {
        let layout = BlockLayout::new(object_size, self.config.guard_band_words);
        let full_name = scoped_name(scope, name, self.config.max_pool_name_bytes);
        let mut inner = self.inner.lock();

        let existing = inner.order.iter().copied().find(|id| {
            let state = inner.pool(*id);
            state.kind == PoolKind::TopLevel && state.name == full_name && state.layout == layout
        });
        if let Some(id) = existing {
            return PoolRef(id);
        }

        let id = inner.create_pool(&self.config, scope, name, layout, PoolKind::TopLevel);
        debug!(pool = %full_name, object_size, "Created shared memory pool");
        PoolRef(id)
    }

    /// Two registries are the same if they share state
    pub fn same_registry(&self, other: &PoolRegistry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[cfg(test)]
    pub(crate) fn clobber_guard(&self, obj: ObjectRef, front: bool) {
        self.inner.lock().arena_mut(obj.arena).clobber_guard(obj.slot, front);
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("PoolRegistry")
            .field("pools", &inner.order.len())
            .field("change_count", &inner.change_count)
            .field("config", &self.config)
            .finish()
    }
}
