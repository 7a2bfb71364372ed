/*!
 * Core Types
 * Common types used across the pool allocator and the hash map
 */

/// Size type for memory operations
pub type Size = usize;

/// Index of a block slot inside a pool arena
pub type SlotIndex = u32;

/// Generation counter stamped into handles to detect stale references
pub type Generation = u32;

/// Machine word size, the unit every block size is rounded to
pub const WORD_SIZE: Size = std::mem::size_of::<usize>();

/// Round `size` up to the next multiple of the machine word
#[inline]
pub const fn round_to_word(size: Size) -> Size {
    let remainder = size % WORD_SIZE;
    if remainder == 0 {
        size
    } else {
        size + (WORD_SIZE - remainder)
    }
}
