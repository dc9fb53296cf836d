//! Embedded last-value data store for device messages.
//!
//! Producers hand byte messages to a [`Service::DataService`]; a relay moves
//! them to the worker side, where WRITE messages are appended to a
//! fixed-capacity arena and READ messages are answered with the newest
//! payload stored for a device.

pub mod error;
pub mod ffi;

// Module naming follows project convention
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Debug;
#[allow(non_snake_case)]
pub mod Service;
#[allow(non_snake_case)]
pub mod Store;
#[allow(non_snake_case)]
pub mod Structs {
    pub mod Message_Structs;
    pub use Message_Structs::{Message, Opcode, ACK, MSG_INLINE}; // re-export for stable path
}

pub use error::{StoreError, StoreResult};
pub use Service::{DataService, Dispatched, PayloadBoundary, ServiceBuilder};
pub use Store::{DataStore, Intent, Layout, RegionKind};
pub use Structs::{Message, Opcode};
