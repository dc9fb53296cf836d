use super::dispatcher::PayloadBoundary;
use super::service::DataService;
use crate::Store::layout::{
    Layout, DEFAULT_DATA_OFFSET, DEFAULT_DEVICE_OFFSET, DEFAULT_DS_SIZE, DEFAULT_ID_OFFSET,
};
use crate::Store::DataStore;
use std::io;

pub struct ServiceBuilder {
    ds_size: usize,
    id_offset: usize,
    device_offset: usize,
    /// `None` once a device capacity overflowed the offset space.
    data_offset: Option<usize>,
    boundary: PayloadBoundary,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self {
            ds_size: DEFAULT_DS_SIZE, // 64KB default
            id_offset: DEFAULT_ID_OFFSET,
            device_offset: DEFAULT_DEVICE_OFFSET,
            data_offset: Some(DEFAULT_DATA_OFFSET),
            boundary: PayloadBoundary::default(),
        }
    }
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arena_size(mut self, size: usize) -> Self {
        self.ds_size = size;
        self
    }

    pub fn with_identity_offset(mut self, offset: usize) -> Self {
        self.id_offset = offset;
        self
    }

    pub fn with_device_offset(mut self, offset: usize) -> Self {
        self.device_offset = offset;
        self
    }

    pub fn with_data_offset(mut self, offset: usize) -> Self {
        self.data_offset = Some(offset);
        self
    }

    /// Size the device region for `devices` ids, starting right after the
    /// identity region, and put the data region behind it.
    pub fn with_device_capacity(mut self, devices: usize) -> Self {
        self.data_offset = self.device_offset.checked_add(devices);
        self
    }

    pub fn with_payload_boundary(mut self, boundary: PayloadBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn layout(&self) -> io::Result<Layout> {
        let data_offset = self.data_offset.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Device capacity overflows the arena layout (device_offset: {})",
                    self.device_offset
                ),
            )
        })?;
        Ok(Layout {
            ds_size: self.ds_size,
            id_offset: self.id_offset,
            device_offset: self.device_offset,
            data_offset,
        })
    }

    pub fn build_store(self) -> io::Result<DataStore> {
        DataStore::new(self.layout()?)
    }

    pub fn build(self) -> io::Result<DataService> {
        let boundary = self.boundary;
        let store = self.build_store()?;
        Ok(DataService::new(store, boundary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store::layout::RegionKind;

    #[test]
    fn device_capacity_moves_data_offset() {
        let store = ServiceBuilder::new()
            .with_arena_size(64)
            .with_device_offset(8)
            .with_device_capacity(4)
            .build_store()
            .unwrap();
        assert_eq!(store.layout().data_offset, 12);
        assert_eq!(store.region(RegionKind::Device).capacity(), 4);
        assert_eq!(store.region(RegionKind::Data).capacity(), 52);
    }

    #[test]
    fn bad_layout_fails_to_build() {
        let err = ServiceBuilder::new()
            .with_arena_size(100)
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn huge_device_capacity_is_rejected() {
        let err = ServiceBuilder::new()
            .with_device_offset(32)
            .with_device_capacity(usize::MAX)
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        // A later explicit data offset replaces the overflowed one
        let store = ServiceBuilder::new()
            .with_device_capacity(usize::MAX)
            .with_data_offset(DEFAULT_DATA_OFFSET)
            .build_store()
            .unwrap();
        assert_eq!(store.layout().data_offset, DEFAULT_DATA_OFFSET);
    }
}
