// Data service: store behind a lock plus inbound and outbound relays

use super::dispatcher::{dispatch, Dispatched, PayloadBoundary};
use super::relay::Relay;
use super::stats::{Stats, StatsSnapshot};
use crate::error::{StoreError, StoreResult};
use crate::Store::DataStore;
use crate::Structs::Message_Structs::Message;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, error, warn};

/// The data plane of the device stack.
///
/// ### Message flow:
/// - **Inbound**: `request` -> rx producer queue -> `rx_copy` -> rx worker
///   queue -> `handle_rx` -> dispatcher -> store.
/// - **Outbound**: READ responses and acks -> tx producer queue -> `tx_copy`
///   -> tx worker queue -> `handle_tx` -> transport.
///
/// The store is only touched while `store` is locked, so any number of
/// threads may call `handle_rx` concurrently. Share it behind an `Arc`.
pub struct DataService {
    pub(crate) store: Mutex<DataStore>,
    pub(crate) rx: Relay,
    pub(crate) tx: Relay,
    pub(crate) boundary: PayloadBoundary,
    pub(crate) stats: Stats,
}

impl DataService {
    pub fn new(store: DataStore, boundary: PayloadBoundary) -> Self {
        Self {
            store: Mutex::new(store),
            rx: Relay::new("rx", "rx_temp", "rx_thread"),
            tx: Relay::new("tx", "tx_temp", "tx_thread"),
            boundary,
            stats: Stats::new(),
        }
    }

    /// Inbound entry point: copy `bytes` into a message and queue it.
    ///
    /// Fails only if `bytes` does not fit in a message.
    pub fn request(&self, bytes: &[u8]) -> StoreResult<()> {
        let msg = Message::from_bytes(bytes)?;
        self.rx.producer().enqueue(msg);
        Ok(())
    }

    /// Queue an acknowledgement for `bytes` (the bytes plus a trailing `ACK`)
    /// on the outbound side.
    pub fn ack_request(&self, bytes: &[u8]) -> StoreResult<()> {
        let ack = Message::from_bytes(bytes)?.ack()?;
        self.tx.producer().enqueue(ack);
        Ok(())
    }

    /// Relay inbound messages to the worker side.
    pub fn rx_copy(&self) -> usize {
        self.rx.relay()
    }

    /// Relay outbound messages to the transport side.
    pub fn tx_copy(&self) -> usize {
        self.tx.relay()
    }

    /// Take one inbound message, blocking until one is relayed, and
    /// dispatch it.
    pub fn handle_rx(&self) -> StoreResult<Dispatched> {
        let msg = self.rx.worker().dequeue();
        self.process(&msg)
    }

    /// Dispatch one inbound message if one is waiting.
    pub fn try_handle_rx(&self) -> Option<StoreResult<Dispatched>> {
        self.rx.worker().try_dequeue().map(|msg| self.process(&msg))
    }

    /// Like `handle_rx`, failing with `Timeout` after `timeout`.
    pub fn handle_rx_timeout(&self, timeout: Duration) -> StoreResult<Dispatched> {
        let msg = self
            .rx
            .worker()
            .dequeue_timeout(timeout)
            .ok_or(StoreError::Timeout)?;
        self.process(&msg)
    }

    /// Outbound exit point: next message for the transport, blocking.
    pub fn handle_tx(&self) -> Message {
        self.tx.worker().dequeue()
    }

    pub fn try_handle_tx(&self) -> Option<Message> {
        self.tx.worker().try_dequeue()
    }

    pub fn handle_tx_timeout(&self, timeout: Duration) -> StoreResult<Message> {
        self.tx
            .worker()
            .dequeue_timeout(timeout)
            .ok_or(StoreError::Timeout)
    }

    /// Dispatch `msg` with the store locked and account for the outcome.
    pub fn process(&self, msg: &Message) -> StoreResult<Dispatched> {
        self.stats.record_received();
        let outcome = {
            let mut store = self.store.lock();
            dispatch(&mut store, msg, self.boundary, self.tx.producer())
        };

        match &outcome {
            Ok(Dispatched::Stored { .. }) => self.stats.record_stored(),
            Ok(Dispatched::Served { .. }) => self.stats.record_served(),
            Ok(Dispatched::Init) => {}
            Err(err) => {
                self.stats.record_error(err);
                match err {
                    StoreError::CapacityExceeded { .. } => warn!(%err, "message dropped"),
                    StoreError::NoEntry { .. } => error!(%err, "registry/log mismatch"),
                    _ => debug!(%err, "message rejected"),
                }
            }
        }
        outcome
    }

    /// Registered device ids in slot order.
    pub fn devices(&self) -> Vec<u8> {
        self.store.lock().devices().to_vec()
    }

    /// Run `f` with the store locked.
    pub fn with_store<R>(&self, f: impl FnOnce(&DataStore) -> R) -> R {
        f(&self.store.lock())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn payload_boundary(&self) -> PayloadBoundary {
        self.boundary
    }

    pub fn rx_relay(&self) -> &Relay {
        &self.rx
    }

    pub fn tx_relay(&self) -> &Relay {
        &self.tx
    }
}
