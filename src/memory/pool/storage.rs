/*!
 * Object Payload Access
 *
 * Bounds-checked reads and writes of an object's bytes. The payload is reachable
 * while the object is live and while its destructor runs; afterwards the handle
 * is reported as released.
 */

use super::block::SlotState;
use super::{PoolRegistry, RegistryInner};
use crate::core::types::Size;
use crate::memory::handle::ObjectRef;
use crate::memory::types::{MemoryError, MemoryResult};

impl RegistryInner {
    fn check_accessible(&self, obj: ObjectRef) -> MemoryResult<()> {
        match self.live_slot(obj).map(|header| header.state) {
            Some(SlotState::Live { .. }) | Some(SlotState::Releasing) => Ok(()),
            Some(SlotState::Free) | None => Err(MemoryError::ReleasedObject(obj)),
        }
    }
}

fn check_range(offset: Size, len: Size, size: Size) -> MemoryResult<()> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(MemoryError::OutOfBounds { offset, len, size }),
    }
}

impl PoolRegistry {
    /// Run `f` over the object's payload
    ///
    /// `f` runs with the registry lock held and must not call back into the registry.
    pub fn with_payload<R>(&self, obj: ObjectRef, f: impl FnOnce(&[u8]) -> R) -> MemoryResult<R> {
        let inner = self.inner.lock();
        inner.check_accessible(obj)?;
        Ok(f(inner.arena(obj.arena).payload(obj.slot)))
    }

    /// Run `f` over the object's payload, mutably
    ///
    /// `f` runs with the registry lock held and must not call back into the registry.
    pub fn with_payload_mut<R>(
        &self,
        obj: ObjectRef,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> MemoryResult<R> {
        let mut inner = self.inner.lock();
        inner.check_accessible(obj)?;
        Ok(f(inner.arena_mut(obj.arena).payload_mut(obj.slot)))
    }

    /// Copy `len` bytes starting at `offset` out of the object
    pub fn read_bytes(&self, obj: ObjectRef, offset: Size, len: Size) -> MemoryResult<Vec<u8>> {
        self.with_payload(obj, |payload| {
            check_range(offset, len, payload.len())?;
            Ok(payload[offset..offset + len].to_vec())
        })?
    }

    /// Copy `data` into the object starting at `offset`
    pub fn write_bytes(&self, obj: ObjectRef, offset: Size, data: &[u8]) -> MemoryResult<()> {
        self.with_payload_mut(obj, |payload| {
            check_range(offset, data.len(), payload.len())?;
            payload[offset..offset + data.len()].copy_from_slice(data);
            Ok(())
        })?
    }
}
