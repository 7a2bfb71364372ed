/*!
 * Hash Map Types
 */

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Hash map result
pub type MapResult<T> = Result<T, MapError>;

/// Recoverable hash map outcomes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum MapError {
    #[error("No more entries")]
    #[diagnostic(code(hashmap::not_found))]
    NotFound,

    #[error("Key not present in map")]
    #[diagnostic(
        code(hashmap::bad_parameter),
        help("node_after needs a key that is currently stored in the map.")
    )]
    BadParameter,
}

/// How a `for_each` walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ForEachOutcome {
    /// Every entry was visited
    Completed,
    /// The callback asked to stop; `remaining` entries were not visited
    StoppedEarly { remaining: usize },
}

impl ForEachOutcome {
    /// True if no entry was left unvisited
    pub fn covered_all(&self) -> bool {
        match self {
            ForEachOutcome::Completed => true,
            ForEachOutcome::StoppedEarly { remaining } => *remaining == 0,
        }
    }
}
