use crate::error::StoreError;
use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Per-outcome counters for dispatched messages.
///
/// Each counter sits on its own cache line; workers on different cores
/// bump different counters without contending.
#[derive(Default)]
pub struct Stats {
    received: CachePadded<AtomicU64>,
    stored: CachePadded<AtomicU64>,
    served: CachePadded<AtomicU64>,
    capacity_exceeded: CachePadded<AtomicU64>,
    unknown_device: CachePadded<AtomicU64>,
    unknown_opcode: CachePadded<AtomicU64>,
    malformed: CachePadded<AtomicU64>,
    invariant_violations: CachePadded<AtomicU64>,
}

/// Point-in-time copy of `Stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub stored: u64,
    pub served: u64,
    pub capacity_exceeded: u64,
    pub unknown_device: u64,
    pub unknown_opcode: u64,
    pub malformed: u64,
    pub invariant_violations: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_stored(&self) {
        self.stored.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_served(&self) {
        self.served.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_error(&self, err: &StoreError) {
        let counter = match err {
            StoreError::CapacityExceeded { .. } => &self.capacity_exceeded,
            StoreError::UnknownDevice(_) => &self.unknown_device,
            StoreError::UnknownOpcode(_) => &self.unknown_opcode,
            StoreError::NoEntry { .. } => &self.invariant_violations,
            StoreError::PayloadTooLarge { .. }
            | StoreError::MessageTooLarge { .. }
            | StoreError::TruncatedMessage { .. } => &self.malformed,
            // Waiting is not a dispatch outcome
            StoreError::Timeout => return,
        };
        counter.fetch_add(1, Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Relaxed),
            stored: self.stored.load(Relaxed),
            served: self.served.load(Relaxed),
            capacity_exceeded: self.capacity_exceeded.load(Relaxed),
            unknown_device: self.unknown_device.load(Relaxed),
            unknown_opcode: self.unknown_opcode.load(Relaxed),
            malformed: self.malformed.load(Relaxed),
            invariant_violations: self.invariant_violations.load(Relaxed),
        }
    }
}
