use crate::Core::arena::Arena;
use crate::Core::queue::MessageQueue;
use crate::Service::{DataService, Relay};
use crate::Store::layout::RegionKind;
use crate::Store::DataStore;
use std::fmt;

/// Debug function for Arena
///
/// Shows the layout and per-region usage, never the raw bytes.
pub fn debug_arena(arena: &Arena, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let usage = |kind| {
        let region = arena.region(kind);
        format!("{}/{} @ {}", region.size, region.capacity(), region.base)
    };
    f.debug_struct("Arena")
        .field("capacity", &arena.capacity())
        .field("identity", &usage(RegionKind::Identity))
        .field("device", &usage(RegionKind::Device))
        .field("data", &usage(RegionKind::Data))
        .finish()
}

/// Debug function for DataStore
///
/// Shows:
/// - Arena usage
/// - Registered devices and their latest offsets
/// - Identity check result
pub fn debug_data_store(store: &DataStore, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let devices: Vec<String> = store
        .devices()
        .iter()
        .enumerate()
        .map(|(slot, id)| match store.latest_offset(slot) {
            Some(offset) => format!("<{id:02x}> -> {offset}"),
            None => format!("<{id:02x}> -> -"),
        })
        .collect();
    f.debug_struct("DataStore")
        .field("arena", store.arena())
        .field("devices", &devices)
        .field("identity_ok", &store.verify_identity())
        .finish()
}

/// Debug function for MessageQueue
pub fn debug_message_queue(queue: &MessageQueue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MessageQueue")
        .field("name", &queue.name())
        .field("len", &queue.len())
        .finish_non_exhaustive()
}

pub fn debug_relay(relay: &Relay, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Relay")
        .field("producer", relay.producer())
        .field("worker", relay.worker())
        .finish_non_exhaustive()
}

/// Debug function for DataService
///
/// Queue depths and counters only; the store is left unlocked.
pub fn debug_data_service(service: &DataService, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DataService")
        .field("boundary", &service.payload_boundary())
        .field("rx", service.rx_relay())
        .field("tx", service.tx_relay())
        .field("stats", &service.stats())
        .finish_non_exhaustive()
}
