/*!
 * Pool Growth
 *
 * Top-level pools grow by allocating a new chunk. Sub-pools grow by taking free
 * blocks from their super-pool, which grows first if it cannot cover the request.
 */

use super::{PoolRegistry, RegistryInner};
use crate::core::types::SlotIndex;
use crate::memory::handle::{PoolHandle, PoolId};
use crate::memory::types::PoolKind;
use tracing::debug;

impl RegistryInner {
    pub(crate) fn expand(&mut self, pool: PoolId, count: usize) {
        if count == 0 {
            return;
        }
        match self.pool(pool).kind {
            PoolKind::TopLevel => self.add_blocks(pool, count),
            PoolKind::SubPoolOf(super_pool) => self.borrow_blocks(super_pool.0, pool, count),
        }
    }

    /// Allocate a new chunk of `count` blocks for a top-level pool
    fn add_blocks(&mut self, pool: PoolId, count: usize) {
        let slots = self.arena_mut(pool).add_chunk(count, pool);

        let state = self.pool_mut(pool);
        for slot in slots {
            state.free_list.push(slot);
        }
        state.total_blocks += count;

        debug!(
            pool = %state.name,
            blocks = count,
            total = state.total_blocks,
            "Added blocks to memory pool"
        );
    }

    /// Lend `count` free blocks of a super-pool to one of its sub-pools
    fn borrow_blocks(&mut self, super_id: PoolId, sub_id: PoolId, count: usize) {
        let available = self.pool(super_id).free_list.len();
        if available < count {
            let shortfall = count - available;
            self.add_blocks(super_id, shortfall);
            self.pool_mut(super_id).num_overflows += shortfall;
        }

        self.move_blocks(super_id, sub_id, count);

        self.pool_mut(sub_id).total_blocks += count;
        let super_state = self.pool_mut(super_id);
        super_state.in_use += count;
        super_state.note_in_use();
    }

    /// Move free blocks between two pools sharing an arena
    ///
    /// Block totals and use counts are left to the caller.
    pub(super) fn move_blocks(&mut self, from: PoolId, to: PoolId, count: usize) {
        let moved: Vec<SlotIndex> = self.pool_mut(from).free_list.pop_many(count);
        if moved.len() < count {
            fatal!(
                "Asked to move {} blocks from pool '{}' to pool '{}', but only {} were available",
                count,
                self.pool(from).name,
                self.pool(to).name,
                moved.len()
            );
        }

        let arena = self.arena_owner(to);
        for slot in &moved {
            match self.arena_mut(arena).slot_mut(*slot) {
                Some(header) => header.owner = to,
                None => fatal!("Free list of {} holds unknown slot {}", from, slot),
            }
        }

        let dest = self.pool_mut(to);
        for slot in moved {
            dest.free_list.push(slot);
        }

        debug!(
            from = %self.pool(from).name,
            to = %self.pool(to).name,
            blocks = count,
            "Moved blocks between memory pools"
        );
    }
}

impl PoolRegistry {
    /// Add `count` free blocks to a pool
    ///
    /// A sub-pool takes them from its super-pool; if the super-pool has too few
    /// free blocks it is grown by the shortfall, which counts as super-pool
    /// overflows.
    pub fn expand<P: PoolHandle>(&self, pool: P, count: usize) -> P {
        self.inner.lock().expand(pool.pool_id(), count);
        pool
    }
}
