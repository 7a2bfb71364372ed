/*!
 * Pool Snapshots
 * Serializable view of every pool in a registry, for diagnostics tooling
 */

use crate::memory::{PoolInfo, PoolRegistry};
use serde::Serialize;
use tracing::info;

/// All pools of a registry at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    /// `list_change_count` when the snapshot was taken
    pub change_count: usize,
    pub pools: Vec<PoolInfo>,
}

impl RegistrySnapshot {
    pub fn capture(registry: &PoolRegistry) -> Self {
        Self {
            change_count: registry.list_change_count(),
            pools: registry.pools(),
        }
    }

    /// True if pools were created or deleted since this snapshot
    pub fn is_stale(&self, registry: &PoolRegistry) -> bool {
        registry.list_change_count() != self.change_count
    }

    /// Bytes held by all top-level pools (sub-pools borrow theirs)
    pub fn total_bytes(&self) -> usize {
        self.pools
            .iter()
            .filter(|info| !info.kind.is_sub_pool())
            .map(|info| info.block_size * info.total_blocks)
            .sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Emit one `info!` line per pool
    pub fn log(&self) {
        for pool in &self.pools {
            info!(
                pool = %pool.name,
                sub_pool = pool.kind.is_sub_pool(),
                object_size = pool.object_size,
                total = pool.total_blocks,
                in_use = pool.stats.num_blocks_in_use,
                max_used = pool.stats.max_num_blocks_used,
                overflows = pool.stats.num_overflows,
                allocs = pool.stats.num_allocs,
                "Memory pool"
            );
        }
    }
}
