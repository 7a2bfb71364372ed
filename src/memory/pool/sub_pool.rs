/*!
 * Sub-Pools
 *
 * A sub-pool borrows blocks from a top-level pool so that one subsystem's usage
 * can be tracked (and capped) separately while sharing the super-pool's chunks.
 */

use super::PoolRegistry;
use crate::memory::handle::{PoolRef, SubPoolRef};
use crate::memory::types::PoolKind;
use tracing::{debug, info};

impl PoolRegistry {
    /// Create a sub-pool holding `count` blocks taken from `super_pool`
    ///
    /// The sub-pool shares the super-pool's object size and inherits its current
    /// destructor. Only top-level pools can be super-pools.
    pub fn create_sub_pool(
        &self,
        super_pool: PoolRef,
        scope: &str,
        name: &str,
        count: usize,
    ) -> SubPoolRef {
        let mut inner = self.inner.lock();
        let metadata = inner.force_alloc(self.sub_pools_pool.0);

        let (layout, destructor) = {
            let parent = inner.pool(super_pool.0);
            (parent.layout, parent.destructor.clone())
        };

        let id = inner.create_pool(
            &self.config,
            scope,
            name,
            layout,
            PoolKind::SubPoolOf(super_pool),
        );
        {
            let state = inner.pool_mut(id);
            state.destructor = destructor;
            state.metadata_block = Some(metadata);
        }

        inner.expand(id, count);

        info!(
            pool = %inner.pool(id).name,
            super_pool = %inner.pool(super_pool.0).name,
            blocks = count,
            "Created memory sub-pool"
        );
        SubPoolRef(id)
    }

    /// Delete a sub-pool, returning all of its blocks to the super-pool
    ///
    /// # Panics
    ///
    /// Panics if any of the sub-pool's blocks are still in use, or if the handle
    /// was already deleted.
    pub fn delete_sub_pool(&self, sub_pool: SubPoolRef) {
        let metadata = {
            let mut inner = self.inner.lock();
            let id = sub_pool.0;

            let (super_id, total, in_use) = {
                let state = inner.pool(id);
                let super_id = match state.kind {
                    PoolKind::SubPoolOf(super_pool) => super_pool.0,
                    PoolKind::TopLevel => fatal!("Memory pool '{}' is not a sub-pool", state.name),
                };
                (super_id, state.total_blocks, state.in_use)
            };

            if in_use != 0 {
                fatal!(
                    "Sub-pool '{}' deleted while {} blocks remain allocated",
                    inner.pool(id).name,
                    in_use
                );
            }

            inner.move_blocks(id, super_id, total);
            inner.pool_mut(super_id).in_use -= total;

            let state = inner.retire_pool(id);
            debug!(pool = %state.name, blocks = total, "Deleted memory sub-pool");
            state.metadata_block
        };

        if let Some(metadata) = metadata {
            self.release(metadata);
        }
    }
}
