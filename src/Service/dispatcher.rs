// Opcode router between inbound messages and the data store

use crate::error::{StoreError, StoreResult};
use crate::Core::queue::MessageQueue;
use crate::Store::DataStore;
use crate::Structs::Message_Structs::{Message, Opcode, HEADER_LEN};
use tracing::{debug, trace};

/// Which bytes of a WRITE message are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadBoundary {
    /// `buf[6 .. 6 + len]`: the application payload only.
    #[default]
    Payload,
    /// `buf[0 .. len]`: the leading `len` bytes of the message, header
    /// included.
    HeaderInclusive,
}

/// What a successfully dispatched message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Init,
    Stored { device: u8, offset: usize, len: usize },
    Served { device: u8, len: usize },
}

/// The bytes of a WRITE message to persist under `boundary`.
pub fn write_payload(msg: &Message, boundary: PayloadBoundary) -> StoreResult<&[u8]> {
    let declared = msg.declared_len();
    let start = match boundary {
        PayloadBoundary::Payload => HEADER_LEN,
        PayloadBoundary::HeaderInclusive => 0,
    };
    let bytes = msg.as_bytes();
    bytes
        .get(start..start + declared)
        .ok_or(StoreError::TruncatedMessage {
            declared,
            available: bytes.len().saturating_sub(start),
        })
}

/// Route one message by its opcode byte.
///
/// WRITE stores under the source id, registering it if needed. READ looks
/// up the destination id and enqueues the stored bytes on `outbound`; an
/// unknown device or opcode produces no outbound message and is reported
/// through the returned error.
pub fn dispatch(
    store: &mut DataStore,
    msg: &Message,
    boundary: PayloadBoundary,
    outbound: &MessageQueue,
) -> StoreResult<Dispatched> {
    match msg.opcode()? {
        Opcode::Init => {
            trace!(src = msg.source(), "init");
            Ok(Dispatched::Init)
        }
        Opcode::Write => {
            let device = msg.source();
            let payload = write_payload(msg, boundary)?;
            let offset = store.put(device, payload)?;
            debug!(device, offset, len = payload.len(), "stored");
            Ok(Dispatched::Stored {
                device,
                offset,
                len: payload.len(),
            })
        }
        Opcode::Read => {
            let device = msg.destination();
            let response = Message::from_bytes(store.get(device)?)?;
            let len = response.len();
            outbound.enqueue(response);
            debug!(device, len, "served");
            Ok(Dispatched::Served { device, len })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store::layout::Layout;

    fn setup() -> (DataStore, MessageQueue) {
        (
            DataStore::new(Layout::default()).unwrap(),
            MessageQueue::new("tx"),
        )
    }

    #[test]
    fn write_then_read() {
        let (mut store, tx) = setup();
        let write = Message::write(0x11, 0x00, &[0xAA, 0xBB]).unwrap();
        let done = dispatch(&mut store, &write, PayloadBoundary::Payload, &tx).unwrap();
        assert!(matches!(done, Dispatched::Stored { device: 0x11, len: 2, .. }));
        assert!(tx.is_empty());

        let read = Message::read(0x01, 0x11);
        let done = dispatch(&mut store, &read, PayloadBoundary::Payload, &tx).unwrap();
        assert_eq!(done, Dispatched::Served { device: 0x11, len: 2 });
        assert_eq!(tx.try_dequeue().unwrap().as_bytes(), &[0xAA, 0xBB]);
    }

    #[test]
    fn read_unknown_device_sends_nothing() {
        let (mut store, tx) = setup();
        let read = Message::read(0x01, 0x22);
        assert_eq!(
            dispatch(&mut store, &read, PayloadBoundary::Payload, &tx),
            Err(StoreError::UnknownDevice(0x22))
        );
        assert!(tx.is_empty());
        assert_eq!(store.device_count(), 0);
    }

    #[test]
    fn init_and_unknown_opcode_are_no_ops() {
        let (mut store, tx) = setup();
        let init = Message::init(0x01, 0x02);
        assert_eq!(
            dispatch(&mut store, &init, PayloadBoundary::Payload, &tx),
            Ok(Dispatched::Init)
        );

        let mut bogus = Message::init(0x01, 0x02);
        bogus.buf[4] = 0x7F;
        assert_eq!(
            dispatch(&mut store, &bogus, PayloadBoundary::Payload, &tx),
            Err(StoreError::UnknownOpcode(0x7F))
        );
        assert!(tx.is_empty());
        assert_eq!(store.data_len(), 0);
    }

    #[test]
    fn header_inclusive_boundary() {
        let (mut store, tx) = setup();
        let write = Message::write(0x11, 0x00, &[0xAA, 0xBB]).unwrap();
        dispatch(&mut store, &write, PayloadBoundary::HeaderInclusive, &tx).unwrap();
        // Two leading bytes of the message: the transport bytes
        assert_eq!(store.get(0x11).unwrap(), &[0x00, 0x00]);

        let write = Message::write(0x11, 0x00, &[1, 2, 3, 4, 5, 6]).unwrap();
        dispatch(&mut store, &write, PayloadBoundary::HeaderInclusive, &tx).unwrap();
        assert_eq!(store.get(0x11).unwrap(), &[0, 0, 0x11, 0x00, 0x02, 0x06]);
    }

    #[test]
    fn truncated_write_is_rejected() {
        let (mut store, tx) = setup();
        // Declares 4 payload bytes, carries 1
        let msg = Message::from_bytes(&[0, 0, 0x11, 0, 0x02, 4, 9]).unwrap();
        assert_eq!(
            dispatch(&mut store, &msg, PayloadBoundary::Payload, &tx),
            Err(StoreError::TruncatedMessage {
                declared: 4,
                available: 1
            })
        );
        assert_eq!(store.device_count(), 0);
    }
}
