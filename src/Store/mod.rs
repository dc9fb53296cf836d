pub mod data_log;
pub mod layout;
pub mod registry;
pub mod Store;

pub use layout::{Layout, Region, RegionKind};
pub use Store::{DataStore, Intent}; // re-export for stable path
