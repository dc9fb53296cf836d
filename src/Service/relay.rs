// Double-buffered handoff between a producer-facing and a worker-facing queue

use crate::Core::queue::MessageQueue;
use parking_lot::Mutex;
use tracing::trace;

/// One direction of the handoff: producer queue -> transfer queue -> worker queue.
///
/// Producers only ever contend with the drain of the producer queue
/// ("export"); the merge into the worker queue ("import") happens after the
/// producer lock is released. Relays in the same direction are serialized so
/// messages keep their enqueue order across concurrent `relay` calls.
pub struct Relay {
    pub(crate) producer: MessageQueue,
    pub(crate) transfer: MessageQueue,
    pub(crate) worker: MessageQueue,
    relay_mutex: Mutex<()>,
}

impl Relay {
    pub fn new(producer: &'static str, transfer: &'static str, worker: &'static str) -> Self {
        Self {
            producer: MessageQueue::new(producer),
            transfer: MessageQueue::new(transfer),
            worker: MessageQueue::new(worker),
            relay_mutex: Mutex::new(()),
        }
    }

    /// Queue producers enqueue onto.
    pub fn producer(&self) -> &MessageQueue {
        &self.producer
    }

    /// Queue workers dequeue from.
    pub fn worker(&self) -> &MessageQueue {
        &self.worker
    }

    /// Move everything queued on the producer side to the worker side.
    /// Returns the number of messages moved.
    pub fn relay(&self) -> usize {
        let _guard = self.relay_mutex.lock();
        let exported = self.producer.export_into(&self.transfer);
        let imported = self.worker.import_from(&self.transfer);
        debug_assert_eq!(exported, imported);
        if imported > 0 {
            trace!(queue = self.worker.name(), moved = imported, "relayed");
        }
        imported
    }

    /// Messages waiting on the producer side.
    pub fn pending(&self) -> usize {
        self.producer.len()
    }
}
