// Fixed-size device message moved between queues by value

use crate::error::{StoreError, StoreResult};
use std::fmt;

/// Size of the inline message buffer.
pub const MSG_INLINE: usize = 256;

/// Header byte positions. Bytes 0-1 belong to the outer transport.
pub const SRC_INDEX: usize = 2;
pub const DST_INDEX: usize = 3;
pub const OPCODE_INDEX: usize = 4;
pub const LEN_INDEX: usize = 5;
pub const HEADER_LEN: usize = 6;

/// Trailing byte appended by `Message::ack`.
pub const ACK: u8 = 0x06;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Init = 0x01,
    Write = 0x02,
    Read = 0x03,
}

impl TryFrom<u8> for Opcode {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Opcode::Init),
            0x02 => Ok(Opcode::Write),
            0x03 => Ok(Opcode::Read),
            other => Err(StoreError::UnknownOpcode(other)),
        }
    }
}

/// A device message: explicit length plus a fixed inline buffer.
///
/// Bytes past `count` are always zero, so header reads on a short message
/// see zeros instead of stale data.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub count: u16,
    pub buf: [u8; MSG_INLINE],
}

impl Message {
    pub const fn empty() -> Self {
        Self {
            count: 0,
            buf: [0u8; MSG_INLINE],
        }
    }

    /// Copy `bytes` into a new message.
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        if bytes.len() > MSG_INLINE {
            return Err(StoreError::MessageTooLarge { len: bytes.len() });
        }
        let mut msg = Self::empty();
        msg.buf[..bytes.len()].copy_from_slice(bytes);
        msg.count = bytes.len() as u16;
        Ok(msg)
    }

    /// Build a WRITE request carrying `payload` for device `src`.
    pub fn write(src: u8, dst: u8, payload: &[u8]) -> StoreResult<Self> {
        if payload.len() > u8::MAX as usize || HEADER_LEN + payload.len() > MSG_INLINE {
            return Err(StoreError::PayloadTooLarge { len: payload.len() });
        }
        let mut msg = Self::header(src, dst, Opcode::Write);
        msg.buf[LEN_INDEX] = payload.len() as u8;
        msg.buf[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
        msg.count = (HEADER_LEN + payload.len()) as u16;
        Ok(msg)
    }

    /// Build a READ request for the latest payload of device `dst`.
    pub fn read(src: u8, dst: u8) -> Self {
        Self::header(src, dst, Opcode::Read)
    }

    pub fn init(src: u8, dst: u8) -> Self {
        Self::header(src, dst, Opcode::Init)
    }

    fn header(src: u8, dst: u8, opcode: Opcode) -> Self {
        let mut msg = Self::empty();
        msg.buf[SRC_INDEX] = src;
        msg.buf[DST_INDEX] = dst;
        msg.buf[OPCODE_INDEX] = opcode as u8;
        msg.count = HEADER_LEN as u16;
        msg
    }

    /// Copy of this message with a trailing `ACK` byte.
    pub fn ack(&self) -> StoreResult<Self> {
        let len = self.len();
        if len >= MSG_INLINE {
            return Err(StoreError::MessageTooLarge { len: len + 1 });
        }
        let mut ack = *self;
        ack.buf[len] = ACK;
        ack.count += 1;
        Ok(ack)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    #[inline]
    pub fn source(&self) -> u8 {
        self.buf[SRC_INDEX]
    }

    #[inline]
    pub fn destination(&self) -> u8 {
        self.buf[DST_INDEX]
    }

    #[inline]
    pub fn opcode_byte(&self) -> u8 {
        self.buf[OPCODE_INDEX]
    }

    pub fn opcode(&self) -> StoreResult<Opcode> {
        Opcode::try_from(self.opcode_byte())
    }

    /// Payload length declared by a WRITE header.
    #[inline]
    pub fn declared_len(&self) -> usize {
        self.buf[LEN_INDEX] as usize
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("count", &self.count)
            .field("bytes", &format_args!("{:02x?}", self.as_bytes()))
            .finish()
    }
}
