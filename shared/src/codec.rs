//! Checksummed codec for serial link framing
//!
//! Every link frame is laid out as:
//! ```text
//! [ 1 byte: SOF (0x01) ][ 1 byte: length ][ N bytes: payload ][ 1 byte: checksum ]
//! ```
//!
//! The length byte counts the payload only. The checksum is the XOR of
//! the length byte and every payload byte, seeded with 0xFF, so line
//! noise is caught before a payload ever reaches the dispatcher.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::{func, NodeId};

/// Start-of-frame marker
pub const SOF: u8 = 0x01;

/// Maximum payload size in bytes; anything larger is line noise
pub const MAX_FRAME_SIZE: usize = 64;

/// Checksum seed
const CHECKSUM_SEED: u8 = 0xff;

/// Errors that can occur while encoding or decoding wire data
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),

    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Truncated data: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Invalid command length byte: {0}")]
    InvalidCommandLength(u8),
}

fn checksum(length: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(CHECKSUM_SEED ^ length, |acc, b| acc ^ b)
}

/// Encode a payload into a complete link frame
pub fn encode_frame(payload: &[u8]) -> Result<Bytes, CodecError> {
    if payload.len() > MAX_FRAME_SIZE {
        return Err(CodecError::FrameTooLarge(payload.len()));
    }

    let len = payload.len() as u8;
    let mut buf = BytesMut::with_capacity(3 + payload.len());
    buf.put_u8(SOF);
    buf.put_u8(len);
    buf.put_slice(payload);
    buf.put_u8(checksum(len, payload));

    Ok(buf.freeze())
}

/// Try to decode one link frame from a buffer
///
/// Returns:
/// - `Ok(Some(payload))` if a complete, checksum-valid frame was decoded
/// - `Ok(None)` if more data is needed (nothing is consumed)
/// - `Err(...)` if the frame is invalid; the offending SOF byte is
///   consumed so the stream can resynchronize on the next call
pub fn decode(buf: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
    // Skip line noise until a start-of-frame marker
    while !buf.is_empty() && buf[0] != SOF {
        buf.advance(1);
    }

    // Need SOF + length before anything else
    if buf.len() < 2 {
        return Ok(None);
    }

    let len = buf[1] as usize;
    if len > MAX_FRAME_SIZE {
        buf.advance(1);
        return Err(CodecError::FrameTooLarge(len));
    }

    // SOF + length + payload + checksum
    let total_len = 3 + len;
    if buf.len() < total_len {
        return Ok(None);
    }

    let expected = checksum(len as u8, &buf[2..2 + len]);
    let actual = buf[2 + len];
    if expected != actual {
        buf.advance(1);
        return Err(CodecError::ChecksumMismatch { expected, actual });
    }

    // Consume SOF and length, split off the payload, drop the checksum
    buf.advance(2);
    let payload = buf.split_to(len).freeze();
    buf.advance(1);

    Ok(Some(payload))
}

/// Decoder state machine for streaming link reads
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Partial frame data being accumulated
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
        }
    }

    /// Add data read from the link to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next frame from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all
    /// complete frames. An `Err` leaves the decoder usable; it has
    /// already discarded the byte that broke synchronization.
    pub fn decode_next(&mut self) -> Result<Option<Bytes>, CodecError> {
        decode(&mut self.buffer)
    }

    /// Current buffer length (for diagnostics)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

/// An application command received from a remote node
///
/// Inside a link frame, an inbound command is laid out as:
/// ```text
/// [ func ][ rx status ][ node id ][ cmd length ][ command class ][ cmd payload... ]
/// ```
/// where `cmd length` counts the command class byte plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationCommand {
    /// Node that sent the command
    pub node_id: NodeId,
    /// Command class the payload belongs to
    pub command_class: u8,
    /// Command-class payload, starting at the sub-command opcode
    pub data: Bytes,
}

impl ApplicationCommand {
    /// Parse an application command out of a link-frame payload
    ///
    /// Returns `Ok(None)` when the frame carries some other serial-API
    /// function; those belong to other parts of the driver. A frame that
    /// claims to be an application command but is shorter than its own
    /// header, or whose length byte points past the end of the buffer,
    /// is a decode error.
    pub fn parse(frame: &[u8]) -> Result<Option<Self>, CodecError> {
        match frame.first() {
            Some(&func::APPLICATION_COMMAND) => {}
            _ => return Ok(None),
        }

        if frame.len() < 5 {
            return Err(CodecError::Truncated {
                needed: 5,
                available: frame.len(),
            });
        }

        let cmd_len = frame[3];
        if cmd_len < 1 {
            return Err(CodecError::InvalidCommandLength(cmd_len));
        }

        let end = 4 + cmd_len as usize;
        if frame.len() < end {
            return Err(CodecError::Truncated {
                needed: end,
                available: frame.len(),
            });
        }

        Ok(Some(Self {
            node_id: frame[2],
            command_class: frame[4],
            data: Bytes::copy_from_slice(&frame[5..end]),
        }))
    }
}

/// An outbound application command, ready for the driver's send queue
///
/// Field order on the wire: target node id, command length, command
/// class id, sub-command opcode, arguments, transmit options. Ownership
/// passes to the driver on submission; nothing here is inspected again
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    target: NodeId,
    buf: Bytes,
}

impl OutboundFrame {
    /// Build an outbound command frame for a single node
    pub fn command(
        target: NodeId,
        command_class: u8,
        opcode: u8,
        args: &[u8],
        tx_options: u8,
    ) -> Self {
        let cmd_len = (2 + args.len()) as u8;

        let mut buf = BytesMut::with_capacity(4 + args.len());
        buf.put_u8(target);
        buf.put_u8(cmd_len);
        buf.put_u8(command_class);
        buf.put_u8(opcode);
        buf.put_slice(args);
        buf.put_u8(tx_options);

        Self {
            target,
            buf: buf.freeze(),
        }
    }

    /// Node this frame is addressed to
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The raw frame content, starting at the target node id
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
