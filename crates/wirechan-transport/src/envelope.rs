use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, TransportError};

/// Envelope header: magic (2) + length (4) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Magic bytes: "WT" (0x57 0x54).
pub const MAGIC: [u8; 2] = [0x57, 0x54];

/// Default maximum message size: 16 MiB.
pub const DEFAULT_MAX_MESSAGE: usize = 16 * 1024 * 1024;

/// Wrap a message in the stream envelope.
///
/// Byte streams do not preserve message boundaries, so stream transports
/// prefix every message with a small header:
/// ```text
/// ┌──────────────┬───────────┬──────────────────┐
/// │ Magic (2B)   │ Length    │ Message          │
/// │ 0x57 0x54    │ (4B LE)   │ (Length bytes)   │
/// │ "WT"         │           │                  │
/// └──────────────┴───────────┴──────────────────┘
/// ```
pub fn encode_envelope(message: &[u8], dst: &mut BytesMut) -> Result<()> {
    if message.len() > u32::MAX as usize {
        return Err(TransportError::MessageTooLarge {
            size: message.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + message.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(message.len() as u32);
    dst.put_slice(message);
    Ok(())
}

/// Extract one enveloped message from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete envelope yet.
/// On success, consumes the envelope bytes from the buffer.
pub fn decode_envelope(src: &mut BytesMut, max_message: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    // Check magic
    if src[0..2] != MAGIC {
        return Err(TransportError::InvalidMagic);
    }

    let message_len = u32::from_le_bytes([src[2], src[3], src[4], src[5]]) as usize;

    if message_len > max_message {
        return Err(TransportError::MessageTooLarge {
            size: message_len,
            max: max_message,
        });
    }

    let total = HEADER_SIZE + message_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let message = src.split_to(message_len).freeze();

    Ok(Some(message))
}

/// Configuration for stream transports.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Maximum message size in bytes. Default: 16 MiB.
    pub max_message_size: usize,
    /// Read timeout for blocking receives. `None` blocks indefinitely.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking sends.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
