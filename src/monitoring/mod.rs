/*!
 * Monitoring
 * Tracing setup and pool snapshots
 */

mod snapshot;
mod tracer;

pub use snapshot::RegistrySnapshot;
pub use tracer::{init_tracing, ENV_TRACE_JSON};
