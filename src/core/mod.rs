/*!
 * Core Module
 * Shared primitive types and system-wide limits
 */

pub mod limits;
pub mod types;

// Re-export for convenience
pub use types::*;
