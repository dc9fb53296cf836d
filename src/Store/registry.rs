use super::layout::RegionKind;
use super::Store::{DataStore, Intent};
use crate::error::{StoreError, StoreResult};
use tracing::debug;

impl DataStore {
    /// Slot index of `id`, scanning the device region in registration order.
    pub fn contains(&self, id: u8) -> Option<usize> {
        self.devices().iter().position(|&dev| dev == id)
    }

    /// Append `id` to the device region and return its new slot index.
    ///
    /// Does not check for duplicates; callers go through `validate`.
    pub fn register(&mut self, id: u8) -> StoreResult<usize> {
        let slot = self.device_count();
        self.arena.spare_mut(RegionKind::Device, 1)?[0] = id;
        self.arena.grow(RegionKind::Device, 1)?;
        // Preallocated to the device capacity, never reallocates
        self.latest.push(None);

        debug!(device = id, slot, "device registered");
        Ok(slot)
    }

    /// Resolve `id` to a slot.
    ///
    /// Known ids return their slot. Unknown ids are registered for `Put`
    /// and rejected with `UnknownDevice` for `Get`.
    pub fn validate(&mut self, id: u8, intent: Intent) -> StoreResult<usize> {
        match (self.contains(id), intent) {
            (Some(slot), _) => Ok(slot),
            (None, Intent::Get) => Err(StoreError::UnknownDevice(id)),
            (None, Intent::Put) => self.register(id),
        }
    }

    /// `validate(id, Intent::Get)` without requiring mutable access.
    pub fn validate_existing(&self, id: u8) -> StoreResult<usize> {
        self.contains(id).ok_or(StoreError::UnknownDevice(id))
    }

    /// Registered device ids in slot order.
    pub fn devices(&self) -> &[u8] {
        self.arena.used(RegionKind::Device)
    }

    pub fn device_count(&self) -> usize {
        self.arena.region(RegionKind::Device).size
    }
}
