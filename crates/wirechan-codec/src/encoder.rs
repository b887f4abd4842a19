use bytes::{BufMut, BytesMut};
use wirechan_channel::{Encoder, WireTag};

use crate::format::{HEADER_SIZE, MAGIC, MAX_WIRE_ARGS, VERSION};

/// Reference [`Encoder`] producing the frame layout described in
/// [`format`](crate::format).
///
/// Argument records accumulate in a body buffer as the channel drives the
/// `on_*` calls; the header is assembled around the body at
/// [`close`](Encoder::close), once the argument count and message id are
/// final. Refusals follow the frame format: a mismatched tag kind, more
/// arguments than `open` declared, or a payload too long for its length
/// field all refuse the call.
#[derive(Debug, Default)]
pub struct WireEncoder {
    expected_args: usize,
    written_args: usize,
    msg_id: i32,
    opened: bool,
    body: BytesMut,
    frame: BytesMut,
}

impl WireEncoder {
    /// Create an encoder with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    fn ready_for_argument(&self) -> bool {
        self.opened && self.written_args < self.expected_args
    }
}

impl Encoder for WireEncoder {
    fn open(&mut self, arg_count: usize) -> bool {
        if arg_count > MAX_WIRE_ARGS {
            return false;
        }
        self.expected_args = arg_count;
        self.written_args = 0;
        self.msg_id = 0;
        self.opened = true;
        self.body.clear();
        self.frame.clear();
        true
    }

    fn on_word(&mut self, bits: u32, tag: WireTag) -> bool {
        if !self.ready_for_argument() || !tag.is_word() {
            return false;
        }
        self.body.put_u8(tag.as_raw());
        self.body.put_u32_le(bits);
        self.written_args += 1;
        true
    }

    fn on_string8(&mut self, bytes: &[u8], tag: WireTag) -> bool {
        if !self.ready_for_argument() {
            return false;
        }
        if !matches!(tag, WireTag::String8 | WireTag::ByteArray) {
            return false;
        }
        if bytes.len() > u32::MAX as usize {
            return false;
        }
        self.body.put_u8(tag.as_raw());
        self.body.put_u32_le(bytes.len() as u32);
        self.body.put_slice(bytes);
        self.written_args += 1;
        true
    }

    fn on_string16(&mut self, units: &[u16], tag: WireTag) -> bool {
        if !self.ready_for_argument() || tag != WireTag::String16 {
            return false;
        }
        if units.len() > u32::MAX as usize {
            return false;
        }
        self.body.put_u8(tag.as_raw());
        self.body.put_u32_le(units.len() as u32);
        for unit in units {
            self.body.put_u16_le(*unit);
        }
        self.written_args += 1;
        true
    }

    fn on_unix_fd(&mut self, fd: i32, tag: WireTag) -> bool {
        if !self.ready_for_argument() || tag != WireTag::UnixFd {
            return false;
        }
        self.body.put_u8(tag.as_raw());
        self.body.put_i32_le(fd);
        self.written_args += 1;
        true
    }

    fn on_win_handle(&mut self, handle: u64, tag: WireTag) -> bool {
        if !self.ready_for_argument() || tag != WireTag::WinHandle {
            return false;
        }
        self.body.put_u8(tag.as_raw());
        self.body.put_u64_le(handle);
        self.written_args += 1;
        true
    }

    fn set_message_id(&mut self, msg_id: i32) {
        self.msg_id = msg_id;
    }

    fn close(&mut self) -> bool {
        if !self.opened || self.written_args != self.expected_args {
            return false;
        }
        if self.body.len() > u32::MAX as usize {
            return false;
        }
        self.frame.reserve(HEADER_SIZE + self.body.len());
        self.frame.put_slice(&MAGIC);
        self.frame.put_u8(VERSION);
        self.frame.put_u8(self.expected_args as u8);
        self.frame.put_i32_le(self.msg_id);
        self.frame.put_u32_le(self.body.len() as u32);
        self.frame.put_slice(&self.body);
        self.opened = false;
        true
    }

    fn buffer(&self) -> &[u8] {
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(msg_id: i32, drive: impl Fn(&mut WireEncoder) -> bool) -> Vec<u8> {
        let mut encoder = WireEncoder::new();
        assert!(drive(&mut encoder));
        encoder.set_message_id(msg_id);
        assert!(encoder.close());
        encoder.buffer().to_vec()
    }

    #[test]
    fn test_frame_layout_for_known_message() {
        let frame = encode(7, |e| {
            e.open(2) && e.on_word(42, WireTag::Int32) && e.on_string8(b"ping", WireTag::String8)
        });

        let mut expected = vec![0x57, 0x43, 0x01, 0x02];
        expected.extend_from_slice(&7i32.to_le_bytes());
        expected.extend_from_slice(&14u32.to_le_bytes());
        expected.push(WireTag::Int32.as_raw());
        expected.extend_from_slice(&42u32.to_le_bytes());
        expected.push(WireTag::String8.as_raw());
        expected.extend_from_slice(&4u32.to_le_bytes());
        expected.extend_from_slice(b"ping");
        assert_eq!(frame, expected);
    }

    #[test]
    fn test_empty_message_is_header_only() {
        let frame = encode(-1, |e| e.open(0));
        assert_eq!(frame.len(), HEADER_SIZE);
        assert_eq!(&frame[4..8], &(-1i32).to_le_bytes());
        assert_eq!(&frame[8..12], &0u32.to_le_bytes());
    }

    #[test]
    fn test_null_string_markers_carry_zero_bits() {
        let frame = encode(1, |e| {
            e.open(2)
                && e.on_word(0, WireTag::NullString8)
                && e.on_word(0, WireTag::NullString16)
        });
        let body = &frame[HEADER_SIZE..];
        assert_eq!(body[0], WireTag::NullString8.as_raw());
        assert_eq!(&body[1..5], &0u32.to_le_bytes());
        assert_eq!(body[5], WireTag::NullString16.as_raw());
        assert_eq!(&body[6..10], &0u32.to_le_bytes());
    }

    #[test]
    fn test_string16_units_are_little_endian() {
        let frame = encode(1, |e| e.open(1) && e.on_string16(&[0x2603, 0x0041], WireTag::String16));
        let body = &frame[HEADER_SIZE..];
        assert_eq!(body[0], WireTag::String16.as_raw());
        assert_eq!(&body[1..5], &2u32.to_le_bytes());
        assert_eq!(&body[5..7], &[0x03, 0x26]);
        assert_eq!(&body[7..9], &[0x41, 0x00]);
    }

    #[test]
    fn test_fd_and_handle_record_layout() {
        let frame = encode(1, |e| {
            e.open(2)
                && e.on_unix_fd(-4, WireTag::UnixFd)
                && e.on_win_handle(0xDEAD_BEEF_CAFE, WireTag::WinHandle)
        });
        let body = &frame[HEADER_SIZE..];
        assert_eq!(body[0], WireTag::UnixFd.as_raw());
        assert_eq!(&body[1..5], &(-4i32).to_le_bytes());
        assert_eq!(body[5], WireTag::WinHandle.as_raw());
        assert_eq!(&body[6..14], &0xDEAD_BEEF_CAFEu64.to_le_bytes());
    }

    #[test]
    fn test_rejects_mismatched_tag_kind() {
        let mut encoder = WireEncoder::new();
        assert!(encoder.open(4));
        assert!(!encoder.on_word(1, WireTag::String8));
        assert!(!encoder.on_string8(b"x", WireTag::Int32));
        assert!(!encoder.on_string16(&[1], WireTag::String8));
        assert!(!encoder.on_unix_fd(3, WireTag::WinHandle));
        assert!(!encoder.on_win_handle(3, WireTag::UnixFd));
    }

    #[test]
    fn test_rejects_argument_beyond_declared_count() {
        let mut encoder = WireEncoder::new();
        assert!(encoder.open(1));
        assert!(encoder.on_word(1, WireTag::Uint32));
        assert!(!encoder.on_word(2, WireTag::Uint32));
    }

    #[test]
    fn test_close_requires_full_argument_list() {
        let mut encoder = WireEncoder::new();
        assert!(encoder.open(2));
        assert!(encoder.on_word(1, WireTag::Uint32));
        assert!(!encoder.close());
    }

    #[test]
    fn test_close_without_open_refused() {
        let mut encoder = WireEncoder::new();
        assert!(!encoder.close());
    }

    #[test]
    fn test_double_close_refused() {
        let mut encoder = WireEncoder::new();
        assert!(encoder.open(0));
        assert!(encoder.close());
        assert!(!encoder.close());
    }

    #[test]
    fn test_open_rejects_count_beyond_wire_limit() {
        let mut encoder = WireEncoder::new();
        assert!(!encoder.open(MAX_WIRE_ARGS + 1));
        assert!(encoder.open(MAX_WIRE_ARGS));
    }

    #[test]
    fn test_buffer_empty_before_close() {
        let mut encoder = WireEncoder::new();
        assert!(encoder.buffer().is_empty());
        assert!(encoder.open(1));
        assert!(encoder.on_word(9, WireTag::Uint32));
        assert!(encoder.buffer().is_empty());
    }

    #[test]
    fn test_open_resets_previous_frame() {
        let mut encoder = WireEncoder::new();
        assert!(encoder.open(1));
        assert!(encoder.on_word(1, WireTag::Int32));
        encoder.set_message_id(5);
        assert!(encoder.close());
        let first = encoder.buffer().to_vec();
        assert!(!first.is_empty());

        assert!(encoder.open(0));
        assert!(encoder.buffer().is_empty());
        encoder.set_message_id(6);
        assert!(encoder.close());
        let second = encoder.buffer().to_vec();
        assert_eq!(second.len(), HEADER_SIZE);
        assert_eq!(&second[4..8], &6i32.to_le_bytes());
    }

    #[test]
    fn test_arguments_refused_after_close() {
        let mut encoder = WireEncoder::new();
        assert!(encoder.open(0));
        assert!(encoder.close());
        assert!(!encoder.on_word(1, WireTag::Int32));
    }
}
