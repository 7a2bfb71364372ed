/*!
 * Mempool Core Library
 * Fixed-block memory pools and a pool-backed hash map
 */

#[macro_use]
mod macros;

pub mod collections;
pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use collections::{Cursor, ForEachOutcome, KeyHashing, MapError, MapResult, StepMap};
pub use memory::{
    AnyPool, MemoryError, MemoryResult, ObjectGuard, ObjectRef, PoolConfig, PoolGuardExt,
    PoolHandle, PoolKind, PoolRef, PoolRegistry, PoolStats, SubPoolRef,
};
pub use monitoring::{init_tracing, RegistrySnapshot};
