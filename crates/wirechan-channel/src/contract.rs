use crate::value::WireTag;

/// Serializes one message into a byte buffer.
///
/// The channel drives an encoder through a fixed call sequence:
/// [`open`](Encoder::open), one `on_*` call per argument in argument order,
/// [`set_message_id`](Encoder::set_message_id), [`close`](Encoder::close),
/// then [`buffer`](Encoder::buffer). Every `bool` return is a success flag;
/// the first refusal aborts the send.
///
/// The encoder owns the finished buffer until the next `open`; the channel
/// borrows it only for the duration of the transport send.
pub trait Encoder {
    /// Start a frame expecting `arg_count` arguments.
    fn open(&mut self, arg_count: usize) -> bool;

    /// Add a fixed-width word argument (scalars and null-string markers).
    fn on_word(&mut self, bits: u32, tag: WireTag) -> bool;

    /// Add an 8-bit-unit payload argument (`String8` or `ByteArray`).
    fn on_string8(&mut self, bytes: &[u8], tag: WireTag) -> bool;

    /// Add a 16-bit-unit string argument.
    fn on_string16(&mut self, units: &[u16], tag: WireTag) -> bool;

    /// Add a file-descriptor argument (value only, no ownership).
    fn on_unix_fd(&mut self, fd: i32, tag: WireTag) -> bool;

    /// Add an opaque handle argument (value only, no ownership).
    fn on_win_handle(&mut self, handle: u64, tag: WireTag) -> bool;

    /// Record the message id.
    fn set_message_id(&mut self, msg_id: i32);

    /// Finalize the frame.
    fn close(&mut self) -> bool;

    /// The finished bytes. Empty means no buffer was produced.
    fn buffer(&self) -> &[u8];
}

/// Receives the decoded parts of one message, in emission order.
///
/// A decoder calls [`on_message_start`](DecodeHandler::on_message_start)
/// first, then one callback per argument. The tag is always passed
/// explicitly; handlers key on it and never infer the kind from payload
/// shape. A `false` return rejects the message and the decoder must latch
/// it as overall failure.
pub trait DecodeHandler {
    fn on_message_start(&mut self, msg_id: i32, arg_count: usize) -> bool;
    fn on_word(&mut self, bits: u32, tag: WireTag) -> bool;
    fn on_string8(&mut self, bytes: &[u8], tag: WireTag) -> bool;
    fn on_string16(&mut self, units: &[u16], tag: WireTag) -> bool;
    fn on_unix_fd(&mut self, fd: i32, tag: WireTag) -> bool;
    fn on_win_handle(&mut self, handle: u64, tag: WireTag) -> bool;
}

/// Consumes bytes incrementally and emits [`DecodeHandler`] callbacks.
///
/// [`feed`](Decoder::feed) returns `true` while more input is expected and
/// `false` once terminated, either complete or irrecoverably failed;
/// [`succeeded`](Decoder::succeeded) distinguishes the two after
/// termination. An empty chunk means the transport has no more data this
/// round; a decoder that is still mid-message must terminate as failed.
pub trait Decoder<H: DecodeHandler> {
    /// Feed the next chunk. Returns `true` while more input is expected.
    fn feed(&mut self, chunk: &[u8], handler: &mut H) -> bool;

    /// Whether the terminated decode produced a valid message.
    fn succeeded(&self) -> bool;
}
