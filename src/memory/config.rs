/*!
 * Pool Configuration
 *
 * Runtime configuration for block layout and registry bootstrap
 */

use crate::core::limits::{
    DEFAULT_BLOCKS_TO_FORCE, DEFAULT_GUARD_BAND_WORDS, DEFAULT_SUB_POOLS_POOL_SIZE,
    MAX_SCOPED_POOL_NAME_BYTES,
};
use tracing::warn;

/// Environment variable overriding `guard_band_words`
pub const ENV_GUARD_BAND_WORDS: &str = "MEMPOOL_GUARD_BAND_WORDS";
/// Environment variable overriding `sub_pools_pool_size`
pub const ENV_SUB_POOLS_POOL_SIZE: &str = "MEMPOOL_SUB_POOLS_POOL_SIZE";
/// Environment variable overriding `default_blocks_to_force`
pub const ENV_FORCE_BLOCKS: &str = "MEMPOOL_FORCE_BLOCKS";
/// Environment variable overriding `max_pool_name_bytes`
pub const ENV_MAX_POOL_NAME_BYTES: &str = "MEMPOOL_MAX_POOL_NAME_BYTES";

/// Pool registry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Guard words written on each side of every payload (0 disables guard bands)
    pub guard_band_words: usize,
    /// Initial size of the internal pool that sub-pool metadata comes from
    pub sub_pools_pool_size: usize,
    /// Growth increment given to new pools for `force_alloc`
    pub default_blocks_to_force: usize,
    /// Scoped pool names longer than this are truncated
    pub max_pool_name_bytes: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            guard_band_words: DEFAULT_GUARD_BAND_WORDS,
            sub_pools_pool_size: DEFAULT_SUB_POOLS_POOL_SIZE,
            default_blocks_to_force: DEFAULT_BLOCKS_TO_FORCE,
            max_pool_name_bytes: MAX_SCOPED_POOL_NAME_BYTES,
        }
    }
}

impl PoolConfig {
    /// Configuration without guard bands (smaller blocks, no corruption detection)
    pub const fn unguarded() -> Self {
        Self {
            guard_band_words: 0,
            sub_pools_pool_size: DEFAULT_SUB_POOLS_POOL_SIZE,
            default_blocks_to_force: DEFAULT_BLOCKS_TO_FORCE,
            max_pool_name_bytes: MAX_SCOPED_POOL_NAME_BYTES,
        }
    }

    /// Load overrides from the environment, keeping defaults for anything unset
    ///
    /// Environment variables:
    /// - MEMPOOL_GUARD_BAND_WORDS
    /// - MEMPOOL_SUB_POOLS_POOL_SIZE
    /// - MEMPOOL_FORCE_BLOCKS
    /// - MEMPOOL_MAX_POOL_NAME_BYTES
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: usize, min: usize| -> usize {
            match lookup(key) {
                None => default,
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(value) if value >= min => value,
                    _ => {
                        warn!(variable = key, value = %raw, default, "Ignoring invalid pool setting");
                        default
                    }
                },
            }
        };

        Self {
            guard_band_words: read(ENV_GUARD_BAND_WORDS, defaults.guard_band_words, 0),
            sub_pools_pool_size: read(ENV_SUB_POOLS_POOL_SIZE, defaults.sub_pools_pool_size, 0),
            default_blocks_to_force: read(ENV_FORCE_BLOCKS, defaults.default_blocks_to_force, 1),
            max_pool_name_bytes: read(ENV_MAX_POOL_NAME_BYTES, defaults.max_pool_name_bytes, 1),
        }
    }

    pub fn with_guard_band_words(mut self, words: usize) -> Self {
        self.guard_band_words = words;
        self
    }

    pub fn with_sub_pools_pool_size(mut self, blocks: usize) -> Self {
        self.sub_pools_pool_size = blocks;
        self
    }

    pub fn with_default_blocks_to_force(mut self, blocks: usize) -> Self {
        self.default_blocks_to_force = blocks.max(1);
        self
    }

    pub fn with_max_pool_name_bytes(mut self, bytes: usize) -> Self {
        self.max_pool_name_bytes = bytes.max(1);
        self
    }
}
