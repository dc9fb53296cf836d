// Fixed-capacity byte arena split into identity, device and data regions

use crate::error::{StoreError, StoreResult};
use crate::Store::layout::{Layout, Region, RegionKind};
use std::io;

/// The single allocation backing all persisted state.
///
/// The buffer is allocated once in `new` and never resized. Every access
/// goes through region offsets; nothing hands out pointers into it.
pub struct Arena {
    pub(crate) layout: Layout,
    pub(crate) bytes: Box<[u8]>,
    /// Running size per region, indexed by `slot_of(kind)`.
    pub(crate) sizes: [usize; 3],
}

#[inline]
fn slot_of(kind: RegionKind) -> usize {
    match kind {
        RegionKind::Identity => 0,
        RegionKind::Device => 1,
        RegionKind::Data => 2,
    }
}

impl Arena {
    /// Validate `layout` and allocate a zeroed arena for it.
    pub fn new(layout: Layout) -> io::Result<Self> {
        layout.validate()?;
        Ok(Self {
            layout,
            bytes: vec![0u8; layout.ds_size].into_boxed_slice(),
            sizes: [0; 3],
        })
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Total arena size in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn region(&self, kind: RegionKind) -> Region {
        Region {
            kind,
            base: self.layout.base(kind),
            size: self.sizes[slot_of(kind)],
            limit: self.layout.limit(kind),
        }
    }

    /// Fail with `CapacityExceeded` unless `n` more bytes fit in the region.
    pub fn check(&self, kind: RegionKind, n: usize) -> StoreResult<()> {
        let region = self.region(kind);
        match region.end().checked_add(n) {
            Some(end) if end <= region.limit => Ok(()),
            _ => Err(StoreError::CapacityExceeded {
                region: kind,
                requested: n,
                remaining: region.remaining(),
            }),
        }
    }

    /// Extend the region's used size by `n` bytes.
    ///
    /// Call only after the bytes have been written through `spare_mut`.
    pub fn grow(&mut self, kind: RegionKind, n: usize) -> StoreResult<()> {
        self.check(kind, n)?;
        self.sizes[slot_of(kind)] += n;
        Ok(())
    }

    /// The `n` unused bytes directly after the region's used part.
    /// Does not change the region size.
    pub fn spare_mut(&mut self, kind: RegionKind, n: usize) -> StoreResult<&mut [u8]> {
        self.check(kind, n)?;
        let start = self.region(kind).end();
        Ok(&mut self.bytes[start..start + n])
    }

    /// The used bytes of a region.
    pub fn used(&self, kind: RegionKind) -> &[u8] {
        let region = self.region(kind);
        &self.bytes[region.base..region.end()]
    }

    /// Read `len` bytes at absolute `offset`, only if they are inside the
    /// used part of `kind`.
    pub fn slice(&self, kind: RegionKind, offset: usize, len: usize) -> Option<&[u8]> {
        if self.region(kind).contains_used(offset, len) {
            Some(&self.bytes[offset..offset + len])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_layout() -> Layout {
        Layout {
            ds_size: 64,
            id_offset: 0,
            device_offset: 8,
            data_offset: 12,
        }
    }

    #[test]
    fn regions_start_empty() {
        let arena = Arena::new(small_layout()).unwrap();
        assert_eq!(arena.capacity(), 64);
        let data = arena.region(RegionKind::Data);
        assert_eq!(data.base, 12);
        assert_eq!(data.size, 0);
        assert_eq!(data.limit, 64);
        assert!(arena.used(RegionKind::Device).is_empty());
    }

    #[test]
    fn grow_stops_at_next_region() {
        let mut arena = Arena::new(small_layout()).unwrap();
        arena.grow(RegionKind::Device, 4).unwrap();
        let err = arena.grow(RegionKind::Device, 1).unwrap_err();
        assert_eq!(
            err,
            StoreError::CapacityExceeded {
                region: RegionKind::Device,
                requested: 1,
                remaining: 0
            }
        );
        assert_eq!(arena.region(RegionKind::Device).size, 4);
    }

    #[test]
    fn write_then_grow() {
        let mut arena = Arena::new(small_layout()).unwrap();
        arena
            .spare_mut(RegionKind::Data, 3)
            .unwrap()
            .copy_from_slice(&[1, 2, 3]);
        // Written but not yet committed
        assert!(arena.slice(RegionKind::Data, 12, 3).is_none());

        arena.grow(RegionKind::Data, 3).unwrap();
        assert_eq!(arena.slice(RegionKind::Data, 12, 3), Some(&[1u8, 2, 3][..]));
        assert_eq!(arena.used(RegionKind::Data), &[1, 2, 3]);
        assert!(arena.slice(RegionKind::Data, 13, 3).is_none());
    }

    #[test]
    fn spare_mut_rejects_overflow() {
        let mut arena = Arena::new(small_layout()).unwrap();
        assert!(arena.spare_mut(RegionKind::Data, 52).is_ok());
        assert!(arena.spare_mut(RegionKind::Data, 53).is_err());
        assert!(arena.check(RegionKind::Data, usize::MAX).is_err());
    }

    #[test]
    fn unvalidated_layout_is_refused() {
        let layout = Layout {
            data_offset: 80,
            ..small_layout()
        };
        let err = Arena::new(layout).err().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
