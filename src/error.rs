//! Error types for store, dispatch and queue operations.

use crate::Store::layout::RegionKind;
use std::io;
use thiserror::Error;

/// Errors raised by a single Put/Get/dispatch invocation.
///
/// None of them leave the arena in a partially written state; the
/// triggering operation is dropped and the store stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A region would grow past the next region's base or the arena end.
    #[error("{region} region full: requested {requested} bytes, {remaining} remaining")]
    CapacityExceeded {
        region: RegionKind,
        requested: usize,
        remaining: usize,
    },

    /// Read of a device that was never written.
    #[error("unknown device <{0:02x}>")]
    UnknownDevice(u8),

    /// Slot has no resolvable data-log entry. Indicates a broken
    /// registry/log invariant rather than a routine condition.
    #[error("no data-log entry for slot {slot}")]
    NoEntry { slot: usize },

    #[error("unknown opcode <{0:02x}>")]
    UnknownOpcode(u8),

    /// Payload does not fit behind a one-byte length prefix.
    #[error("payload of {len} bytes exceeds the 255 byte entry limit")]
    PayloadTooLarge { len: usize },

    #[error("message of {len} bytes exceeds the inline buffer")]
    MessageTooLarge { len: usize },

    /// The WRITE length byte points past the end of the message.
    #[error("message declares {declared} payload bytes but only {available} are present")]
    TruncatedMessage { declared: usize, available: usize },

    #[error("timed out waiting for a message")]
    Timeout,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for io::Error {
    fn from(err: StoreError) -> Self {
        let kind = match err {
            StoreError::CapacityExceeded { .. } => io::ErrorKind::OutOfMemory,
            StoreError::UnknownDevice(_) | StoreError::NoEntry { .. } => io::ErrorKind::NotFound,
            StoreError::UnknownOpcode(_)
            | StoreError::PayloadTooLarge { .. }
            | StoreError::MessageTooLarge { .. }
            | StoreError::TruncatedMessage { .. } => io::ErrorKind::InvalidInput,
            StoreError::Timeout => io::ErrorKind::TimedOut,
        };
        io::Error::new(kind, err)
    }
}
