use super::layout::RegionKind;
use super::Store::DataStore;
use crate::error::{StoreError, StoreResult};
use tracing::trace;

impl DataStore {
    /// Append a `[len][payload]` entry for `slot` and make it the slot's
    /// latest value. Returns the arena offset of the length byte.
    ///
    /// Bytes are written first; the region size and index move only once
    /// the entry is complete.
    pub fn append(&mut self, slot: usize, payload: &[u8]) -> StoreResult<usize> {
        if slot >= self.latest.len() {
            return Err(StoreError::NoEntry { slot });
        }
        if payload.len() > u8::MAX as usize {
            return Err(StoreError::PayloadTooLarge { len: payload.len() });
        }

        let entry_len = 1 + payload.len();
        let offset = self.arena.region(RegionKind::Data).end();
        let spare = self.arena.spare_mut(RegionKind::Data, entry_len)?;
        spare[0] = payload.len() as u8;
        spare[1..].copy_from_slice(payload);
        self.arena.grow(RegionKind::Data, entry_len)?;
        self.latest[slot] = Some(offset);

        trace!(slot, offset, len = payload.len(), "data-log entry appended");
        Ok(offset)
    }

    /// Payload of the newest entry for `slot`, borrowed from the arena.
    ///
    /// The stored offset is re-checked against the used data region on
    /// every call.
    pub fn read_latest(&self, slot: usize) -> StoreResult<&[u8]> {
        let no_entry = StoreError::NoEntry { slot };
        let offset = self.latest_offset(slot).ok_or(no_entry.clone())?;
        let len = self
            .arena
            .slice(RegionKind::Data, offset, 1)
            .ok_or(no_entry.clone())?[0] as usize;
        self.arena
            .slice(RegionKind::Data, offset + 1, len)
            .ok_or(no_entry)
    }

    /// Arena offset of the newest entry for `slot`, if it has one.
    pub fn latest_offset(&self, slot: usize) -> Option<usize> {
        self.latest.get(slot).copied().flatten()
    }
}
