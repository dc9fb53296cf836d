use std::fmt;
use std::io;

/// Default arena size in bytes.
pub const DEFAULT_DS_SIZE: usize = 64 * 1024;

/// Default region offsets. The identity region holds a full SHA-256
/// fingerprint and the device region one byte per possible device id.
pub const DEFAULT_ID_OFFSET: usize = 0;
pub const DEFAULT_DEVICE_OFFSET: usize = DEFAULT_ID_OFFSET + 32;
pub const DEFAULT_DATA_OFFSET: usize = DEFAULT_DEVICE_OFFSET + 256;

/// Version of the region layout, folded into the identity fingerprint.
pub const LAYOUT_VERSION: u32 = 1;

/// The three regions carved out of the arena, in initialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Identity,
    Device,
    Data,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionKind::Identity => "identity",
            RegionKind::Device => "device",
            RegionKind::Data => "data",
        };
        f.write_str(name)
    }
}

/// Static placement of the regions inside an arena of `ds_size` bytes.
///
/// Offsets are absolute arena offsets. A region extends from its own base
/// to the next region's base; the data region extends to the arena end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub ds_size: usize,
    pub id_offset: usize,
    pub device_offset: usize,
    pub data_offset: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            ds_size: DEFAULT_DS_SIZE,
            id_offset: DEFAULT_ID_OFFSET,
            device_offset: DEFAULT_DEVICE_OFFSET,
            data_offset: DEFAULT_DATA_OFFSET,
        }
    }
}

impl Layout {
    /// Check that the regions are ordered and fit inside the arena.
    pub fn validate(&self) -> io::Result<()> {
        if self.id_offset > self.device_offset
            || self.device_offset > self.data_offset
            || self.data_offset > self.ds_size
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Invalid arena layout:\n\
                    ├─ id_offset:     {}\n\
                    ├─ device_offset: {}\n\
                    ├─ data_offset:   {}\n\
                    ╰─ ds_size:       {}",
                    self.id_offset, self.device_offset, self.data_offset, self.ds_size
                ),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn base(&self, kind: RegionKind) -> usize {
        match kind {
            RegionKind::Identity => self.id_offset,
            RegionKind::Device => self.device_offset,
            RegionKind::Data => self.data_offset,
        }
    }

    /// First offset past the region: the next region's base or the arena end.
    #[inline]
    pub fn limit(&self, kind: RegionKind) -> usize {
        match kind {
            RegionKind::Identity => self.device_offset,
            RegionKind::Device => self.data_offset,
            RegionKind::Data => self.ds_size,
        }
    }

    #[inline]
    pub fn capacity(&self, kind: RegionKind) -> usize {
        self.limit(kind) - self.base(kind)
    }
}

/// Snapshot of one region's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub base: usize,
    pub size: usize,
    pub limit: usize,
}

impl Region {
    /// Offset one past the last used byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.base + self.size
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit - self.end()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.limit - self.base
    }

    /// True if `[offset, offset + len)` lies inside the used part of the region.
    #[inline]
    pub fn contains_used(&self, offset: usize, len: usize) -> bool {
        offset >= self.base && offset.checked_add(len).is_some_and(|end| end <= self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_valid() {
        let layout = Layout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.capacity(RegionKind::Identity), 32);
        assert_eq!(layout.capacity(RegionKind::Device), 256);
        assert_eq!(
            layout.capacity(RegionKind::Data),
            DEFAULT_DS_SIZE - DEFAULT_DATA_OFFSET
        );
    }

    #[test]
    fn out_of_order_layout_is_rejected() {
        let layout = Layout {
            ds_size: 64,
            id_offset: 0,
            device_offset: 40,
            data_offset: 20,
        };
        let err = layout.validate().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let too_big = Layout {
            ds_size: 64,
            id_offset: 0,
            device_offset: 8,
            data_offset: 65,
        };
        assert!(too_big.validate().is_err());
    }

    #[test]
    fn region_used_bounds() {
        let region = Region {
            kind: RegionKind::Data,
            base: 10,
            size: 5,
            limit: 20,
        };
        assert_eq!(region.end(), 15);
        assert_eq!(region.remaining(), 5);
        assert!(region.contains_used(10, 5));
        assert!(!region.contains_used(12, 4));
        assert!(!region.contains_used(9, 1));
        assert!(!region.contains_used(usize::MAX, 2));
    }
}
