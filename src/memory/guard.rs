/*!
 * Object Guards
 *
 * RAII ownership of one pool object reference
 */

use super::handle::{ObjectRef, PoolHandle};
use super::pool::PoolRegistry;
use super::types::MemoryResult;
use crate::core::types::Size;

/// One counted reference to a pool object
///
/// Cloning adds a reference; dropping releases one. The last drop runs the
/// pool's destructor and returns the block.
///
/// # Example
///
/// ```rust
/// use mempool_core::memory::{PoolGuardExt, PoolRegistry};
///
/// let registry = PoolRegistry::new();
/// let pool = registry.create_pool("demo", "guarded", 16);
///
/// let guard = registry.force_alloc_guard(pool);
/// let shared = guard.clone();
/// assert_eq!(guard.ref_count(), 2);
/// drop(shared);
/// drop(guard);
/// assert_eq!(registry.stats(pool).num_blocks_in_use, 0);
/// ```
pub struct ObjectGuard {
    registry: PoolRegistry,
    object: ObjectRef,
}

impl ObjectGuard {
    /// Take ownership of one existing reference
    #[inline]
    pub fn adopt(registry: &PoolRegistry, object: ObjectRef) -> Self {
        Self {
            registry: registry.clone(),
            object,
        }
    }

    #[inline]
    pub fn object(&self) -> ObjectRef {
        self.object
    }

    #[inline]
    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn ref_count(&self) -> usize {
        self.registry.ref_count(self.object)
    }

    pub fn size(&self) -> Size {
        self.registry.block_size(self.object)
    }

    pub fn read(&self, offset: Size, len: Size) -> MemoryResult<Vec<u8>> {
        self.registry.read_bytes(self.object, offset, len)
    }

    pub fn write(&self, offset: Size, data: &[u8]) -> MemoryResult<()> {
        self.registry.write_bytes(self.object, offset, data)
    }

    /// Give up the guard without releasing; the caller now owns the reference
    pub fn into_object(self) -> ObjectRef {
        let mut this = std::mem::ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, and the registry field is not touched again
        unsafe { std::ptr::drop_in_place(&mut this.registry) };
        this.object
    }
}

impl Clone for ObjectGuard {
    fn clone(&self) -> Self {
        self.registry.add_ref(self.object);
        Self {
            registry: self.registry.clone(),
            object: self.object,
        }
    }
}

impl Drop for ObjectGuard {
    fn drop(&mut self) {
        self.registry.release(self.object);
    }
}

impl std::fmt::Debug for ObjectGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectGuard")
            .field("object", &self.object)
            .finish()
    }
}

/// Guard-returning allocation
pub trait PoolGuardExt {
    fn force_alloc_guard<P: PoolHandle>(&self, pool: P) -> ObjectGuard;

    fn try_alloc_guard<P: PoolHandle>(&self, pool: P) -> Option<ObjectGuard>;

    fn assert_alloc_guard<P: PoolHandle>(&self, pool: P) -> ObjectGuard;
}

impl PoolGuardExt for PoolRegistry {
    fn force_alloc_guard<P: PoolHandle>(&self, pool: P) -> ObjectGuard {
        ObjectGuard::adopt(self, self.force_alloc(pool))
    }

    fn try_alloc_guard<P: PoolHandle>(&self, pool: P) -> Option<ObjectGuard> {
        self.try_alloc(pool).map(|object| ObjectGuard::adopt(self, object))
    }

    fn assert_alloc_guard<P: PoolHandle>(&self, pool: P) -> ObjectGuard {
        ObjectGuard::adopt(self, self.assert_alloc(pool))
    }
}
