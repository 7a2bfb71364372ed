/*!
 * Internal Macros
 */

/// Log an unrecoverable invariant violation and panic with the same message
///
/// Heap-graph corruption is never handled: the first detection point halts.
macro_rules! fatal {
    ($($arg:tt)+) => {{
        let message = format!($($arg)+);
        tracing::error!(target: "mempool_core::fatal", "{}", message);
        panic!("{}", message)
    }};
}
