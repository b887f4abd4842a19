use bytes::{Buf, BytesMut};
use tracing::debug;
use wirechan_channel::{DecodeHandler, Decoder, WireTag};

use crate::format::{DEFAULT_MAX_BODY, HEADER_SIZE, MAGIC, VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Header,
    Body {
        msg_id: i32,
        arg_count: usize,
        body_len: usize,
    },
    Done,
    Failed,
}

/// Reference [`Decoder`] for the frame layout described in
/// [`format`](crate::format).
///
/// Chunks accumulate until the header and then the full body are present;
/// the handler callbacks for a message fire in one burst once its last
/// byte arrives. Any structural violation latches the decoder as failed:
/// bad magic or version, a body over the size limit, an unknown tag, a
/// record that overruns or underruns the declared body, input that ends
/// mid-frame, or a handler veto.
///
/// A decoder handles exactly one frame. After it terminates, further
/// [`feed`](Decoder::feed) calls return `false` without consuming input.
#[derive(Debug)]
pub struct WireDecoder {
    state: DecodeState,
    buf: BytesMut,
    max_body: usize,
}

impl Default for WireDecoder {
    fn default() -> Self {
        Self::with_max_body_size(DEFAULT_MAX_BODY)
    }
}

impl WireDecoder {
    /// Create a decoder with the default body size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder that rejects frames whose body exceeds `max_body`.
    pub fn with_max_body_size(max_body: usize) -> Self {
        Self {
            state: DecodeState::Header,
            buf: BytesMut::new(),
            max_body,
        }
    }

    /// Whether the terminated decode produced a valid frame.
    pub fn succeeded(&self) -> bool {
        self.state == DecodeState::Done
    }

    fn fail(&mut self, reason: &'static str) -> bool {
        debug!(reason, "frame decode failed");
        self.state = DecodeState::Failed;
        false
    }

    fn consume<H: DecodeHandler>(&mut self, chunk: &[u8], handler: &mut H) -> bool {
        if matches!(self.state, DecodeState::Done | DecodeState::Failed) {
            return false;
        }
        if chunk.is_empty() {
            return self.fail("input ended mid-frame");
        }
        self.buf.extend_from_slice(chunk);

        if self.state == DecodeState::Header {
            if self.buf.len() < HEADER_SIZE {
                return true;
            }
            if self.buf[0..2] != MAGIC {
                return self.fail("bad magic");
            }
            if self.buf[2] != VERSION {
                return self.fail("unsupported version");
            }
            let arg_count = self.buf[3] as usize;
            let msg_id = i32::from_le_bytes(self.buf[4..8].try_into().unwrap());
            let body_len = u32::from_le_bytes(self.buf[8..12].try_into().unwrap()) as usize;
            if body_len > self.max_body {
                return self.fail("body exceeds size limit");
            }
            self.buf.advance(HEADER_SIZE);
            self.state = DecodeState::Body {
                msg_id,
                arg_count,
                body_len,
            };
        }

        if let DecodeState::Body {
            msg_id,
            arg_count,
            body_len,
        } = self.state
        {
            if self.buf.len() < body_len {
                return true;
            }
            if self.buf.len() > body_len {
                return self.fail("bytes past end of frame");
            }
            if !handler.on_message_start(msg_id, arg_count) {
                return self.fail("handler rejected message start");
            }
            let body = self.buf.split_to(body_len).freeze();
            if !emit_arguments(&body, arg_count, handler) {
                return self.fail("malformed or rejected argument");
            }
            self.state = DecodeState::Done;
        }
        false
    }
}

impl<H: DecodeHandler> Decoder<H> for WireDecoder {
    fn feed(&mut self, chunk: &[u8], handler: &mut H) -> bool {
        self.consume(chunk, handler)
    }

    fn succeeded(&self) -> bool {
        WireDecoder::succeeded(self)
    }
}

fn emit_arguments<H: DecodeHandler>(body: &[u8], arg_count: usize, handler: &mut H) -> bool {
    let mut cursor = BodyCursor::new(body);
    for _ in 0..arg_count {
        if !emit_argument(&mut cursor, handler) {
            return false;
        }
    }
    // The declared count must account for every body byte.
    cursor.is_exhausted()
}

fn emit_argument<H: DecodeHandler>(cursor: &mut BodyCursor<'_>, handler: &mut H) -> bool {
    let Some(raw) = cursor.read_u8() else {
        return false;
    };
    let Some(tag) = WireTag::from_raw(raw) else {
        return false;
    };
    match tag {
        WireTag::Int32
        | WireTag::Uint32
        | WireTag::Char8
        | WireTag::Char16
        | WireTag::NullString8
        | WireTag::NullString16 => {
            let Some(bits) = cursor.read_u32_le() else {
                return false;
            };
            handler.on_word(bits, tag)
        }
        WireTag::String8 | WireTag::ByteArray => {
            let Some(len) = cursor.read_u32_le() else {
                return false;
            };
            let Some(bytes) = cursor.take(len as usize) else {
                return false;
            };
            handler.on_string8(bytes, tag)
        }
        WireTag::String16 => {
            let Some(count) = cursor.read_u32_le() else {
                return false;
            };
            let Some(byte_len) = (count as usize).checked_mul(2) else {
                return false;
            };
            let Some(bytes) = cursor.take(byte_len) else {
                return false;
            };
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            handler.on_string16(&units, tag)
        }
        WireTag::UnixFd => {
            let Some(fd) = cursor.read_i32_le() else {
                return false;
            };
            handler.on_unix_fd(fd, tag)
        }
        WireTag::WinHandle => {
            let Some(handle) = cursor.read_u64_le() else {
                return false;
            };
            handler.on_win_handle(handle, tag)
        }
        WireTag::None => false,
    }
}

/// Bounds-checked reads over one frame body.
struct BodyCursor<'a> {
    body: &'a [u8],
    offset: usize,
}

impl<'a> BodyCursor<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self { body, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(len)?;
        let slice = self.body.get(self.offset..end)?;
        self.offset = end;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.body.get(self.offset)?;
        self.offset += 1;
        Some(byte)
    }

    fn read_u32_le(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }

    fn read_i32_le(&mut self) -> Option<i32> {
        let bytes = self.take(4)?;
        Some(i32::from_le_bytes(bytes.try_into().ok()?))
    }

    fn read_u64_le(&mut self) -> Option<u64> {
        let bytes = self.take(8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    fn is_exhausted(&self) -> bool {
        self.offset == self.body.len()
    }
}
