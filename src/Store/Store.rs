// The record store: arena, device registry and data-log index

use super::layout::{Layout, Region, RegionKind, LAYOUT_VERSION};
use crate::error::{StoreError, StoreResult};
use crate::Core::arena::Arena;
use sha2::{Digest, Sha256};
use std::io;
use tracing::{debug, warn};

/// Domain tag mixed into the identity fingerprint.
const IDENTITY_TAG: &[u8] = b"DMXP_DATASERVICE";

/// Longest identity stamp (a full SHA-256 digest).
pub const IDENTITY_LEN: usize = 32;

/// Why a device id is being validated.
///
/// Writes register unknown devices; reads never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Put,
    Get,
}

/// Last-value store for per-device payloads.
///
/// Layout inside the arena:
/// - identity region: layout fingerprint, written once in `new`
/// - device region: one id byte per registered device, in slot order
/// - data region: packed `[len][payload]` entries, append-only
///
/// `latest[slot]` is the absolute arena offset of the newest entry for the
/// device in that slot. Superseded entries stay in the data region and are
/// never reclaimed.
pub struct DataStore {
    pub(crate) arena: Arena,
    pub(crate) latest: Vec<Option<usize>>,
}

impl DataStore {
    /// Allocate the arena for `layout` and stamp its identity region.
    pub fn new(layout: Layout) -> io::Result<Self> {
        let mut arena = Arena::new(layout)?;
        let digest = fingerprint(&layout);
        let stamp_len = IDENTITY_LEN.min(layout.capacity(RegionKind::Identity));
        arena
            .spare_mut(RegionKind::Identity, stamp_len)?
            .copy_from_slice(&digest[..stamp_len]);
        arena.grow(RegionKind::Identity, stamp_len)?;

        debug!(
            ds_size = layout.ds_size,
            devices = layout.capacity(RegionKind::Device),
            data = layout.capacity(RegionKind::Data),
            "data store initialized"
        );

        Ok(Self {
            arena,
            latest: Vec::with_capacity(layout.capacity(RegionKind::Device)),
        })
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn layout(&self) -> &Layout {
        self.arena.layout()
    }

    pub fn region(&self, kind: RegionKind) -> Region {
        self.arena.region(kind)
    }

    /// Bytes of the data log in use, superseded entries included.
    pub fn data_len(&self) -> usize {
        self.arena.region(RegionKind::Data).size
    }

    /// The identity stamp written at construction.
    pub fn identity(&self) -> &[u8] {
        self.arena.used(RegionKind::Identity)
    }

    /// Recompute the layout fingerprint and compare it with the stamp.
    pub fn verify_identity(&self) -> bool {
        let digest = fingerprint(self.layout());
        let stamp = self.identity();
        stamp == &digest[..stamp.len()]
    }

    /// Store `payload` as the latest value for device `id`, registering the
    /// device on first use. Returns the arena offset of the new entry.
    ///
    /// All capacity checks run before anything is written, so a failed put
    /// leaves sizes, registry and index untouched.
    pub fn put(&mut self, id: u8, payload: &[u8]) -> StoreResult<usize> {
        if payload.len() > u8::MAX as usize {
            return Err(StoreError::PayloadTooLarge { len: payload.len() });
        }

        let prepared = self.arena.check(RegionKind::Data, 1 + payload.len()).and_then(|_| {
            if self.contains(id).is_none() {
                self.arena.check(RegionKind::Device, 1)
            } else {
                Ok(())
            }
        });
        if let Err(err) = prepared {
            warn!(device = id, len = payload.len(), %err, "put dropped");
            return Err(err);
        }

        let slot = self.validate(id, Intent::Put)?;
        self.append(slot, payload)
    }

    /// The latest payload stored for device `id`.
    pub fn get(&self, id: u8) -> StoreResult<&[u8]> {
        let slot = self.validate_existing(id)?;
        self.read_latest(slot)
    }
}

fn fingerprint(layout: &Layout) -> [u8; IDENTITY_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(IDENTITY_TAG);
    hasher.update(LAYOUT_VERSION.to_le_bytes());
    for value in [
        layout.ds_size,
        layout.id_offset,
        layout.device_offset,
        layout.data_offset,
    ] {
        hasher.update((value as u64).to_le_bytes());
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_layout() -> Layout {
        Layout {
            ds_size: 64,
            id_offset: 0,
            device_offset: 8,
            data_offset: 12,
        }
    }

    #[test]
    fn identity_is_stamped_and_verifiable() {
        let store = DataStore::new(scenario_layout()).unwrap();
        assert_eq!(store.identity().len(), 8);
        assert!(store.verify_identity());

        let other = DataStore::new(Layout {
            ds_size: 128,
            ..scenario_layout()
        })
        .unwrap();
        assert_ne!(store.identity(), other.identity());
    }

    #[test]
    fn empty_identity_region_is_allowed() {
        let store = DataStore::new(Layout {
            ds_size: 32,
            id_offset: 0,
            device_offset: 0,
            data_offset: 4,
        })
        .unwrap();
        assert!(store.identity().is_empty());
        assert!(store.verify_identity());
    }

    #[test]
    fn invalid_layout_fails_construction() {
        let err = DataStore::new(Layout {
            ds_size: 16,
            id_offset: 0,
            device_offset: 8,
            data_offset: 32,
        })
        .err()
        .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn last_write_wins() {
        let mut store = DataStore::new(scenario_layout()).unwrap();
        store.put(0x11, &[0xAA, 0xBB]).unwrap();
        assert_eq!(store.get(0x11).unwrap(), &[0xAA, 0xBB]);
        store.put(0x11, &[0xCC]).unwrap();
        assert_eq!(store.get(0x11).unwrap(), &[0xCC]);
        // Superseded entry is still occupying the log
        assert_eq!(store.data_len(), 3 + 2);
    }

    #[test]
    fn get_unknown_device() {
        let store = DataStore::new(scenario_layout()).unwrap();
        assert_eq!(store.get(0x22), Err(StoreError::UnknownDevice(0x22)));
        assert_eq!(store.device_count(), 0);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut store = DataStore::new(Layout::default()).unwrap();
        let payload = vec![0u8; 256];
        assert_eq!(
            store.put(1, &payload),
            Err(StoreError::PayloadTooLarge { len: 256 })
        );
        assert_eq!(store.device_count(), 0);
    }

    #[test]
    fn failed_put_leaves_state_unchanged() {
        let mut store = DataStore::new(scenario_layout()).unwrap();
        store.put(0x11, &[1; 40]).unwrap();
        let before_data = store.data_len();

        // 41 bytes used out of 52, a new device needing 12 must fail
        let err = store.put(0x22, &[2; 11]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CapacityExceeded {
                region: RegionKind::Data,
                ..
            }
        ));
        assert_eq!(store.data_len(), before_data);
        assert_eq!(store.devices(), &[0x11]);
        assert_eq!(store.get(0x22), Err(StoreError::UnknownDevice(0x22)));
        assert_eq!(store.get(0x11).unwrap(), &[1; 40][..]);
    }

    #[test]
    fn full_device_region_rejects_new_ids_only() {
        let mut store = DataStore::new(scenario_layout()).unwrap();
        for id in 1..=4 {
            store.put(id, &[id]).unwrap();
        }
        let data_before = store.data_len();
        assert!(matches!(
            store.put(5, &[5]),
            Err(StoreError::CapacityExceeded {
                region: RegionKind::Device,
                ..
            })
        ));
        assert_eq!(store.data_len(), data_before);

        // Known ids can still write
        store.put(2, &[9, 9]).unwrap();
        assert_eq!(store.get(2).unwrap(), &[9, 9]);
    }
}
