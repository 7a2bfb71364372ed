/*!
 * Collections
 * Pool-backed containers
 */

pub mod hashmap;

pub use hashmap::{Cursor, ForEachOutcome, Iter, KeyHashing, MapError, MapResult, StepMap};
