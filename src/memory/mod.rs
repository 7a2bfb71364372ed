/*!
 * Memory Module
 * Fixed-size block pools, sub-pools and reference-counted objects
 */

pub mod config;
pub mod guard;
pub mod handle;
pub mod pool;
pub mod types;

// Re-export for convenience
pub use config::PoolConfig;
pub use guard::{ObjectGuard, PoolGuardExt};
pub use handle::{AnyPool, ObjectRef, PoolHandle, PoolId, PoolRef, SubPoolRef};
pub use pool::PoolRegistry;
pub use types::*;
