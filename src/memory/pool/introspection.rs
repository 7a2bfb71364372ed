/*!
 * Pool Introspection
 * Statistics, names, sizes and lookups
 */

use super::{scoped_name, PoolRegistry, PoolState, RegistryInner};
use crate::core::types::Size;
use crate::memory::handle::{AnyPool, ObjectRef, PoolHandle, PoolId, PoolRef, SubPoolRef};
use crate::memory::types::{MemoryError, MemoryResult, PoolInfo, PoolKind, PoolStats};
use std::sync::Arc;

impl PoolState {
    fn stats(&self) -> PoolStats {
        PoolStats {
            num_allocs: self.num_allocs,
            num_overflows: self.num_overflows,
            num_free: self.total_blocks - self.in_use,
            num_blocks_in_use: self.in_use,
            max_num_blocks_used: self.max_used,
        }
    }
}

impl RegistryInner {
    fn any_pool(&self, id: PoolId) -> AnyPool {
        match self.pool(id).kind {
            PoolKind::TopLevel => AnyPool::Pool(PoolRef(id)),
            PoolKind::SubPoolOf(_) => AnyPool::SubPool(SubPoolRef(id)),
        }
    }
}

impl PoolRegistry {
    /// Snapshot of a pool's counters
    pub fn stats<P: PoolHandle>(&self, pool: P) -> PoolStats {
        self.inner.lock().pool(pool.pool_id()).stats()
    }

    /// Zero the allocation and overflow counters
    ///
    /// Block counts and the high-water mark are left untouched.
    pub fn reset_stats<P: PoolHandle>(&self, pool: P) {
        let mut inner = self.inner.lock();
        let state = inner.pool_mut(pool.pool_id());
        state.num_allocs = 0;
        state.num_overflows = 0;
    }

    /// Scoped name ("scope.name")
    pub fn name<P: PoolHandle>(&self, pool: P) -> String {
        self.inner.lock().pool(pool.pool_id()).name.clone()
    }

    pub fn is_sub_pool<P: PoolHandle>(&self, pool: P) -> bool {
        self.inner.lock().pool(pool.pool_id()).kind.is_sub_pool()
    }

    pub fn kind<P: PoolHandle>(&self, pool: P) -> PoolKind {
        self.inner.lock().pool(pool.pool_id()).kind
    }

    /// The top-level pool a sub-pool borrows from
    pub fn super_pool(&self, sub_pool: SubPoolRef) -> PoolRef {
        let inner = self.inner.lock();
        let state = inner.pool(sub_pool.0);
        match state.kind {
            PoolKind::SubPoolOf(super_pool) => super_pool,
            PoolKind::TopLevel => fatal!("Memory pool '{}' is not a sub-pool", state.name),
        }
    }

    /// Total blocks, free and in use
    pub fn object_count<P: PoolHandle>(&self, pool: P) -> usize {
        self.inner.lock().pool(pool.pool_id()).total_blocks
    }

    /// Usable bytes per object
    pub fn object_size<P: PoolHandle>(&self, pool: P) -> Size {
        self.inner.lock().pool(pool.pool_id()).layout.object_size
    }

    /// Bytes per block including header and guard bands
    pub fn object_full_size<P: PoolHandle>(&self, pool: P) -> Size {
        self.inner.lock().pool(pool.pool_id()).layout.block_size
    }

    /// Install the function run when an object's last reference is released
    ///
    /// Sub-pools created afterwards inherit it; existing sub-pools keep theirs.
    pub fn set_destructor<P, F>(&self, pool: P, destructor: F)
    where
        P: PoolHandle,
        F: Fn(&PoolRegistry, ObjectRef) + Send + Sync + 'static,
    {
        self.inner.lock().pool_mut(pool.pool_id()).destructor = Some(Arc::new(destructor));
    }

    /// Remove a pool's destructor
    pub fn clear_destructor<P: PoolHandle>(&self, pool: P) {
        self.inner.lock().pool_mut(pool.pool_id()).destructor = None;
    }

    /// Number of blocks `force_alloc` adds when the pool runs dry (at least 1)
    pub fn set_num_objs_to_force<P: PoolHandle>(&self, pool: P, count: usize) {
        self.inner.lock().pool_mut(pool.pool_id()).blocks_to_force = count.max(1);
    }

    /// Find a pool by scope and name
    ///
    /// Returns the first match in creation order. The internal sub-pools pool is
    /// never returned.
    pub fn find_pool(&self, scope: &str, name: &str) -> Option<AnyPool> {
        let full_name = scoped_name(scope, name, self.config.max_pool_name_bytes);
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .copied()
            .filter(|id| *id != self.sub_pools_pool.0)
            .find(|id| inner.pool(*id).name == full_name)
            .map(|id| inner.any_pool(id))
    }

    /// Like `find_pool`, but an error when nothing matches
    pub fn lookup_pool(&self, scope: &str, name: &str) -> MemoryResult<AnyPool> {
        self.find_pool(scope, name)
            .ok_or_else(|| MemoryError::PoolNotFound(format!("{}.{}", scope, name)))
    }

    /// Snapshot of every pool in creation order, internal pools included
    pub fn pools(&self) -> Vec<PoolInfo> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .map(|id| {
                let state = inner.pool(*id);
                PoolInfo {
                    handle: inner.any_pool(*id),
                    name: state.name.clone(),
                    kind: state.kind,
                    object_size: state.layout.object_size,
                    block_size: state.layout.block_size,
                    total_blocks: state.total_blocks,
                    stats: state.stats(),
                }
            })
            .collect()
    }

    /// Incremented whenever a pool is created or deleted
    pub fn list_change_count(&self) -> usize {
        self.inner.lock().change_count
    }

    /// Pool currently owning an object's block
    pub fn pool_of(&self, obj: ObjectRef) -> AnyPool {
        let inner = self.inner.lock();
        match inner.live_slot(obj) {
            Some(header) => inner.any_pool(header.owner),
            None => fatal!("Stale or foreign object reference {}", obj),
        }
    }

    /// Object size of the pool owning `obj`
    pub fn block_size(&self, obj: ObjectRef) -> Size {
        let inner = self.inner.lock();
        match inner.live_slot(obj) {
            Some(header) => inner.pool(header.owner).layout.object_size,
            None => fatal!("Stale or foreign object reference {}", obj),
        }
    }
}
