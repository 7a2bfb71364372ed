/*!
 * Block Free List
 * LIFO stack of free slot indices
 */

use crate::core::types::SlotIndex;

/// Free blocks of one pool
///
/// Treated as a stack: the most recently released block is handed out first,
/// which keeps recently touched memory hot when allocations and releases are
/// interleaved.
#[derive(Debug, Default)]
pub(crate) struct FreeList {
    slots: Vec<SlotIndex>,
}

impl FreeList {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, slot: SlotIndex) {
        self.slots.push(slot);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<SlotIndex> {
        self.slots.pop()
    }

    /// Pop up to `count` blocks, most recently freed first
    pub fn pop_many(&mut self, count: usize) -> Vec<SlotIndex> {
        let keep = self.slots.len().saturating_sub(count);
        let mut taken = self.slots.split_off(keep);
        taken.reverse();
        taken
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
