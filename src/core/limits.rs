/*!
 * System Limits and Constants
 *
 * Centralized location for allocator and hash map limits, thresholds, and magic numbers.
 * Values marked [COMPAT] match the block layout expected by existing pool tooling.
 */

use super::types::{Size, WORD_SIZE};

// =============================================================================
// POOL LAYOUT
// =============================================================================

/// Sentinel value written into every guard-band word
pub const GUARD_WORD: u32 = 0xDEAD_BEEF;

/// Bytes per guard-band word
pub const GUARD_WORD_BYTES: Size = std::mem::size_of::<u32>();

/// Default number of guard words on each side of a payload
/// [COMPAT] 8 words = 32 bytes per fence
pub const DEFAULT_GUARD_BAND_WORDS: usize = 8;

/// Per-block header: owning pool + reference count
/// [COMPAT] Counted in the full block size even though the header lives in the slot table
pub const BLOCK_HEADER_SIZE: Size = 2 * WORD_SIZE;

/// Smallest payload a block may hold (room for a free-list link)
pub const MIN_PAYLOAD_SIZE: Size = WORD_SIZE;

/// Blocks added by each automatic expansion in `force_alloc`
pub const DEFAULT_BLOCKS_TO_FORCE: usize = 1;

// =============================================================================
// POOL NAMING
// =============================================================================

/// Longest component (scope) name
pub const MAX_COMPONENT_NAME_LEN: usize = 47;

/// Longest pool name inside a component
pub const MAX_POOL_NAME_BYTES: usize = 32;

/// Longest scoped pool name "component.pool"
pub const MAX_SCOPED_POOL_NAME_BYTES: usize = MAX_COMPONENT_NAME_LEN + 1 + MAX_POOL_NAME_BYTES;

// =============================================================================
// SUB-POOLS
// =============================================================================

/// Scope used for pools owned by the runtime itself
pub const FRAMEWORK_SCOPE: &str = "framework";

/// Name of the internal pool that sub-pool metadata is checked out of
pub const SUB_POOLS_POOL_NAME: &str = "SubPools";

/// Initial number of sub-pool metadata blocks
pub const DEFAULT_SUB_POOLS_POOL_SIZE: usize = 8;

// =============================================================================
// HASH MAP
// =============================================================================

/// Smallest bucket array a map will use
pub const MIN_BUCKET_COUNT: usize = 4;

/// Shared top-level pool every map's entry sub-pool borrows from
pub const HASHMAP_POOL_NAME: &str = "hashMap";

/// Prefix of the entry sub-pool created for every map
pub const HASHMAP_POOL_PREFIX: &str = "hashMap_";

/// Object size of entry blocks; a block only accounts for one entry
pub const HASHMAP_ENTRY_BLOCK_SIZE: Size = WORD_SIZE;
