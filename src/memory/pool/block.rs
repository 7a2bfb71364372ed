/*!
 * Block Arena
 *
 * Every top-level pool owns one arena. Each expansion allocates one contiguous
 * chunk of `n × block_size` bytes and slices it into blocks:
 *
 * ```text
 * | header | front guard | payload (object_size) ... pad | back guard |
 * ```
 *
 * The header bytes are reserved so the full block size matches the classic
 * layout; the live header (owner, reference count) sits in the slot table.
 * Guard words are filled with `GUARD_WORD` when the chunk is sliced and are
 * verified whenever a block changes hands.
 */

use crate::core::limits::{BLOCK_HEADER_SIZE, GUARD_WORD, GUARD_WORD_BYTES, MIN_PAYLOAD_SIZE};
use crate::core::types::{round_to_word, Generation, Size, SlotIndex};
use crate::memory::handle::PoolId;
use std::ops::Range;

/// Byte layout shared by every block of a pool (and its sub-pools)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockLayout {
    pub object_size: Size,
    pub block_size: Size,
    pub guard_bytes: Size,
    pub payload_offset: Size,
}

impl BlockLayout {
    pub fn new(object_size: Size, guard_words: usize) -> Self {
        let guard_bytes = guard_words * GUARD_WORD_BYTES;
        let payload = object_size.max(MIN_PAYLOAD_SIZE);
        let block_size = round_to_word(BLOCK_HEADER_SIZE + payload + 2 * guard_bytes);

        Self {
            object_size,
            block_size,
            guard_bytes,
            payload_offset: BLOCK_HEADER_SIZE + guard_bytes,
        }
    }

    #[inline]
    fn back_guard_offset(&self) -> Size {
        self.block_size - self.guard_bytes
    }
}

/// Reference-count state of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Free,
    Live { refs: usize },
    /// Last reference dropped, destructor running, not yet back on a free list
    Releasing,
}

impl SlotState {
    pub fn ref_count(&self) -> usize {
        match self {
            SlotState::Live { refs } => *refs,
            SlotState::Free | SlotState::Releasing => 0,
        }
    }
}

/// Per-block header
#[derive(Debug)]
pub(crate) struct Slot {
    chunk: u32,
    offset: Size,
    pub owner: PoolId,
    pub state: SlotState,
    pub generation: Generation,
}

/// A guard word that no longer holds the sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GuardViolation {
    pub front: bool,
    pub word_offset: Size,
    pub found: u32,
}

impl GuardViolation {
    pub fn position(&self) -> &'static str {
        if self.front {
            "before"
        } else {
            "at end of"
        }
    }
}

#[derive(Debug)]
pub(crate) struct BlockArena {
    layout: BlockLayout,
    chunks: Vec<Box<[u8]>>,
    slots: Vec<Slot>,
}

impl BlockArena {
    pub fn new(layout: BlockLayout) -> Self {
        Self {
            layout,
            chunks: Vec::new(),
            slots: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Allocate one chunk of `count` blocks owned by `owner`
    ///
    /// Returns the slot indices of the new blocks.
    pub fn add_chunk(&mut self, count: usize, owner: PoolId) -> Range<SlotIndex> {
        let block_size = self.layout.block_size;
        let chunk_index = self.chunks.len() as u32;
        let mut chunk = vec![0u8; count * block_size].into_boxed_slice();

        let first = self.len() as SlotIndex;
        for i in 0..count {
            let offset = i * block_size;
            self.write_guards(&mut chunk[offset..offset + block_size]);
            self.slots.push(Slot {
                chunk: chunk_index,
                offset,
                owner,
                state: SlotState::Free,
                generation: 0,
            });
        }
        self.chunks.push(chunk);

        first..first + count as SlotIndex
    }

    fn write_guards(&self, block: &mut [u8]) {
        if self.layout.guard_bytes == 0 {
            return;
        }
        let front = BLOCK_HEADER_SIZE;
        let back = self.layout.back_guard_offset();
        for start in [front, back] {
            for word in block[start..start + self.layout.guard_bytes].chunks_exact_mut(GUARD_WORD_BYTES) {
                word.copy_from_slice(&GUARD_WORD.to_ne_bytes());
            }
        }
    }

    #[inline]
    pub fn slot(&self, slot: SlotIndex) -> Option<&Slot> {
        self.slots.get(slot as usize)
    }

    #[inline]
    pub fn slot_mut(&mut self, slot: SlotIndex) -> Option<&mut Slot> {
        self.slots.get_mut(slot as usize)
    }

    fn block(&self, slot: SlotIndex) -> &[u8] {
        let meta = &self.slots[slot as usize];
        let chunk = &self.chunks[meta.chunk as usize];
        &chunk[meta.offset..meta.offset + self.layout.block_size]
    }

    fn block_mut(&mut self, slot: SlotIndex) -> &mut [u8] {
        let (chunk, offset) = {
            let meta = &self.slots[slot as usize];
            (meta.chunk as usize, meta.offset)
        };
        let block_size = self.layout.block_size;
        &mut self.chunks[chunk][offset..offset + block_size]
    }

    /// Verify both guard bands of a block
    pub fn check_guards(&self, slot: SlotIndex) -> Result<(), GuardViolation> {
        let guard_bytes = self.layout.guard_bytes;
        if guard_bytes == 0 {
            return Ok(());
        }
        let block = self.block(slot);
        let fences = [
            (true, BLOCK_HEADER_SIZE),
            (false, self.layout.back_guard_offset()),
        ];

        for (front, start) in fences {
            for (i, word) in block[start..start + guard_bytes]
                .chunks_exact(GUARD_WORD_BYTES)
                .enumerate()
            {
                let mut raw = [0u8; GUARD_WORD_BYTES];
                raw.copy_from_slice(word);
                let found = u32::from_ne_bytes(raw);
                if found != GUARD_WORD {
                    return Err(GuardViolation {
                        front,
                        word_offset: start + i * GUARD_WORD_BYTES,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    /// User-visible bytes of a block
    pub fn payload(&self, slot: SlotIndex) -> &[u8] {
        let start = self.layout.payload_offset;
        let end = start + self.layout.object_size;
        &self.block(slot)[start..end]
    }

    pub fn payload_mut(&mut self, slot: SlotIndex) -> &mut [u8] {
        let start = self.layout.payload_offset;
        let end = start + self.layout.object_size;
        &mut self.block_mut(slot)[start..end]
    }

    /// Overwrite one guard byte, simulating a buffer overrun
    #[cfg(test)]
    pub fn clobber_guard(&mut self, slot: SlotIndex, front: bool) {
        let offset = if front {
            BLOCK_HEADER_SIZE
        } else {
            self.layout.back_guard_offset()
        };
        self.block_mut(slot)[offset] ^= 0xFF;
    }
}
