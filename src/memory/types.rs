/*!
 * Memory Types
 * Common types for pool management
 */

use super::handle::{AnyPool, ObjectRef, PoolRef};
use super::pool::PoolRegistry;
use crate::core::types::Size;
use miette::Diagnostic;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Recoverable memory errors
///
/// Invariant violations (double release, guard-band corruption, ...) are not
/// represented here: they panic.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Access out of bounds: offset {offset} + {len} bytes exceeds object size {size}")]
    #[diagnostic(
        code(memory::out_of_bounds),
        help("Payload accesses must stay within the pool's object size.")
    )]
    OutOfBounds { offset: Size, len: Size, size: Size },

    #[error("Object {0} has already been released")]
    #[diagnostic(
        code(memory::released_object),
        help("The handle outlived its last reference. Keep a reference with add_ref or an ObjectGuard.")
    )]
    ReleasedObject(ObjectRef),

    #[error("Memory pool '{0}' not found")]
    #[diagnostic(code(memory::pool_not_found))]
    PoolNotFound(String),
}

/// Called once an object's last reference is released
///
/// Runs without the registry lock held, so it may allocate and release other
/// objects and may read the dying object's payload.
pub type Destructor = Arc<dyn Fn(&PoolRegistry, ObjectRef) + Send + Sync>;

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Successful allocations since creation or the last reset
    pub num_allocs: usize,
    /// Times the pool had to grow because it ran dry
    pub num_overflows: usize,
    /// Blocks currently on the free list
    pub num_free: usize,
    /// Blocks handed out (for a super-pool this includes blocks lent to sub-pools)
    pub num_blocks_in_use: usize,
    /// High-water mark of `num_blocks_in_use`
    pub max_num_blocks_used: usize,
}

impl PoolStats {
    /// Total blocks owned by the pool
    pub fn total_blocks(&self) -> usize {
        self.num_free + self.num_blocks_in_use
    }
}

/// Position of a pool in the pool hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "super_pool", rename_all = "snake_case")]
pub enum PoolKind {
    TopLevel,
    SubPoolOf(PoolRef),
}

impl PoolKind {
    pub fn is_sub_pool(&self) -> bool {
        matches!(self, PoolKind::SubPoolOf(_))
    }
}

/// Snapshot of one pool for introspection tooling
#[derive(Debug, Clone, Serialize)]
pub struct PoolInfo {
    pub handle: AnyPool,
    pub name: String,
    pub kind: PoolKind,
    pub object_size: Size,
    pub block_size: Size,
    pub total_blocks: usize,
    pub stats: PoolStats,
}
