use bytes::Bytes;

use crate::channel::MAX_ARGS;
use crate::contract::DecodeHandler;
use crate::value::{WireTag, WireValue};

/// Materializes one incoming message from decoder callbacks.
///
/// Created fresh for every receive, mutated only through the
/// [`DecodeHandler`] callbacks in the order the decoder emits them, then
/// discarded after dispatch. The message id stays `None` until the decoder
/// announces the message start.
#[derive(Debug, Default)]
pub struct ReceiveAccumulator {
    msg_id: Option<i32>,
    args: Vec<WireValue>,
}

impl ReceiveAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded message id, if the decoder announced one.
    pub fn message_id(&self) -> Option<i32> {
        self.msg_id
    }

    pub fn argument_count(&self) -> usize {
        self.args.len()
    }

    /// Bounds-checked argument access.
    pub fn argument(&self, index: usize) -> Option<&WireValue> {
        self.args.get(index)
    }

    /// All decoded arguments in wire order.
    pub fn arguments(&self) -> &[WireValue] {
        &self.args
    }
}

impl DecodeHandler for ReceiveAccumulator {
    fn on_message_start(&mut self, msg_id: i32, arg_count: usize) -> bool {
        self.msg_id = Some(msg_id);
        // The count comes straight off the wire; never reserve past the cap.
        self.args.reserve(arg_count.min(MAX_ARGS));
        true
    }

    fn on_word(&mut self, bits: u32, tag: WireTag) -> bool {
        let value = match tag {
            WireTag::Int32 => WireValue::Int32(bits as i32),
            WireTag::Uint32 => WireValue::Uint32(bits),
            WireTag::Char8 => WireValue::Char8(bits as u8),
            WireTag::Char16 => WireValue::Char16(bits as u16),
            WireTag::NullString8 => WireValue::NullString8,
            WireTag::NullString16 => WireValue::NullString16,
            _ => return false,
        };
        self.args.push(value);
        true
    }

    fn on_string8(&mut self, bytes: &[u8], tag: WireTag) -> bool {
        let value = match tag {
            WireTag::String8 => WireValue::String8(Bytes::copy_from_slice(bytes)),
            WireTag::ByteArray => WireValue::ByteArray(Bytes::copy_from_slice(bytes)),
            _ => return false,
        };
        self.args.push(value);
        true
    }

    fn on_string16(&mut self, units: &[u16], tag: WireTag) -> bool {
        match tag {
            WireTag::String16 => {
                self.args.push(WireValue::String16(units.to_vec()));
                true
            }
            _ => false,
        }
    }

    fn on_unix_fd(&mut self, fd: i32, tag: WireTag) -> bool {
        match tag {
            WireTag::UnixFd => {
                self.args.push(WireValue::UnixFd(fd));
                true
            }
            _ => false,
        }
    }

    fn on_win_handle(&mut self, handle: u64, tag: WireTag) -> bool {
        match tag {
            WireTag::WinHandle => {
                self.args.push(WireValue::WinHandle(handle));
                true
            }
            _ => false,
        }
    }
}
