/*!
 * Allocation and Reference Counting
 */

use super::block::SlotState;
use super::{PoolRegistry, RegistryInner};
use crate::memory::handle::{ObjectRef, PoolHandle, PoolId};
use parking_lot::MutexGuard;
use tracing::warn;

impl RegistryInner {
    /// Pop a free block, or `None` if the pool has none
    pub(crate) fn try_alloc(&mut self, pool: PoolId) -> Option<ObjectRef> {
        let slot = {
            let state = self.pool_mut(pool);
            let slot = state.free_list.pop()?;
            state.num_allocs += 1;
            state.in_use += 1;
            state.note_in_use();
            slot
        };

        let arena = self.arena_owner(pool);
        let generation = {
            let header = match self.arena_mut(arena).slot_mut(slot) {
                Some(header) => header,
                None => fatal!("Free list of {} holds unknown slot {}", pool, slot),
            };
            if header.state != SlotState::Free {
                fatal!("Free list of {} holds block {} in state {:?}", pool, slot, header.state);
            }
            header.state = SlotState::Live { refs: 1 };
            header.generation = header.generation.wrapping_add(1);
            header.generation
        };

        let obj = ObjectRef {
            arena,
            slot,
            generation,
        };
        self.verify_guards(obj);
        Some(obj)
    }

    /// Allocate, growing the pool by its force increment until a block is free
    pub(crate) fn force_alloc(&mut self, pool: PoolId) -> ObjectRef {
        loop {
            if let Some(obj) = self.try_alloc(pool) {
                return obj;
            }

            let increment = self.pool(pool).blocks_to_force;
            self.expand(pool, increment);

            let state = self.pool_mut(pool);
            state.num_overflows += 1;
            warn!(
                pool = %state.name,
                blocks = increment,
                total = state.total_blocks,
                "Memory pool overflowed, expanded"
            );
        }
    }
}

impl PoolRegistry {
    /// Allocate an object, or `None` if the pool is empty
    ///
    /// Never grows the pool. The object starts with a reference count of 1.
    pub fn try_alloc<P: PoolHandle>(&self, pool: P) -> Option<ObjectRef> {
        self.inner.lock().try_alloc(pool.pool_id())
    }

    /// Allocate an object, growing the pool if it is empty
    ///
    /// Each growth step adds the pool's force increment (see `set_num_objs_to_force`)
    /// and counts as one overflow.
    pub fn force_alloc<P: PoolHandle>(&self, pool: P) -> ObjectRef {
        self.inner.lock().force_alloc(pool.pool_id())
    }

    /// Allocate an object from a pool that must not be empty
    ///
    /// # Panics
    ///
    /// Panics if the pool has no free block.
    pub fn assert_alloc<P: PoolHandle>(&self, pool: P) -> ObjectRef {
        let mut inner = self.inner.lock();
        let id = pool.pool_id();
        match inner.try_alloc(id) {
            Some(obj) => obj,
            None => fatal!("Memory pool '{}' is exhausted", inner.pool(id).name),
        }
    }

    /// Drop one reference to an object
    ///
    /// Releasing the last reference runs the owning pool's destructor (without the
    /// registry lock held) and then returns the block to the pool.
    ///
    /// # Panics
    ///
    /// Panics on a double release, a stale handle or a damaged guard band.
    pub fn release(&self, obj: ObjectRef) {
        let mut inner = self.inner.lock();
        // Reject stale handles before touching the block
        inner.slot_mut(obj);
        inner.verify_guards(obj);

        let owner = {
            let header = inner.slot_mut(obj);
            match header.state {
                SlotState::Live { refs } if refs > 1 => {
                    header.state = SlotState::Live { refs: refs - 1 };
                    return;
                }
                SlotState::Live { .. } => {
                    header.state = SlotState::Releasing;
                    header.owner
                }
                SlotState::Free => fatal!("Free block {} released", obj),
                SlotState::Releasing => {
                    fatal!("Block {} released again while its destructor is running", obj)
                }
            }
        };

        let destructor = inner.pool(owner).destructor.clone();
        if let Some(destructor) = destructor {
            MutexGuard::unlocked(&mut inner, || destructor(self, obj));
        }

        // Pushed back only now: the destructor may still read the payload.
        inner.slot_mut(obj).state = SlotState::Free;
        let state = inner.pool_mut(owner);
        state.free_list.push(obj.slot);
        state.in_use -= 1;
    }

    /// Add one reference to a live object
    ///
    /// # Panics
    ///
    /// Panics if the object was already released or its guard band is damaged.
    pub fn add_ref(&self, obj: ObjectRef) {
        let mut inner = self.inner.lock();
        inner.slot_mut(obj);
        inner.verify_guards(obj);

        let header = inner.slot_mut(obj);
        match header.state {
            SlotState::Live { refs } => header.state = SlotState::Live { refs: refs + 1 },
            SlotState::Free | SlotState::Releasing => {
                fatal!("Reference added to released object {}", obj)
            }
        }
    }

    /// Current reference count (0 once the object is released)
    pub fn ref_count(&self, obj: ObjectRef) -> usize {
        self.inner
            .lock()
            .live_slot(obj)
            .map(|header| header.state.ref_count())
            .unwrap_or(0)
    }
}
