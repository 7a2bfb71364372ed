/*!
 * Pool and Object Handles
 *
 * Opaque, copyable references into a `PoolRegistry`. Every handle carries a
 * generation so that a handle outliving its target is detected instead of
 * silently aliasing a recycled slot.
 */

use crate::core::types::{Generation, SlotIndex};
use serde::Serialize;
use std::fmt;

/// Identity of a pool slot in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PoolId {
    pub(crate) index: u32,
    pub(crate) generation: Generation,
}

impl PoolId {
    pub(crate) const fn new(index: u32, generation: Generation) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}.{}", self.index, self.generation)
    }
}

/// Handle to a top-level pool
///
/// Top-level pools are never deleted, and only they can parent a sub-pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PoolRef(pub(crate) PoolId);

/// Handle to a sub-pool carved out of a top-level pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubPoolRef(pub(crate) PoolId);

/// Either kind of pool, as returned by lookups and introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AnyPool {
    Pool(PoolRef),
    SubPool(SubPoolRef),
}

impl AnyPool {
    /// The top-level handle, if this is a top-level pool
    pub fn as_pool(self) -> Option<PoolRef> {
        match self {
            AnyPool::Pool(pool) => Some(pool),
            AnyPool::SubPool(_) => None,
        }
    }

    /// The sub-pool handle, if this is a sub-pool
    pub fn as_sub_pool(self) -> Option<SubPoolRef> {
        match self {
            AnyPool::Pool(_) => None,
            AnyPool::SubPool(sub) => Some(sub),
        }
    }
}

impl From<PoolRef> for AnyPool {
    fn from(pool: PoolRef) -> Self {
        AnyPool::Pool(pool)
    }
}

impl From<SubPoolRef> for AnyPool {
    fn from(sub: SubPoolRef) -> Self {
        AnyPool::SubPool(sub)
    }
}

mod private {
    pub trait Sealed {}

    impl Sealed for super::PoolRef {}
    impl Sealed for super::SubPoolRef {}
    impl Sealed for super::AnyPool {}
}

/// Anything that names a pool in a registry
pub trait PoolHandle: private::Sealed + Copy {
    fn pool_id(&self) -> PoolId;
}

impl PoolHandle for PoolRef {
    #[inline]
    fn pool_id(&self) -> PoolId {
        self.0
    }
}

impl PoolHandle for SubPoolRef {
    #[inline]
    fn pool_id(&self) -> PoolId {
        self.0
    }
}

impl PoolHandle for AnyPool {
    #[inline]
    fn pool_id(&self) -> PoolId {
        match self {
            AnyPool::Pool(pool) => pool.0,
            AnyPool::SubPool(sub) => sub.0,
        }
    }
}

/// Reference to one allocated object
///
/// `arena` is the top-level pool whose chunks hold the block; the block's current
/// owner may be a sub-pool of it. `generation` changes every time the slot is
/// handed out, so a handle kept past its final release is recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectRef {
    pub(crate) arena: PoolId,
    pub(crate) slot: SlotIndex,
    pub(crate) generation: Generation,
}

impl ObjectRef {
    /// Slot index inside the owning arena
    #[inline]
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Allocation generation of this handle
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/slot{}@{}", self.arena, self.slot, self.generation)
    }
}
