use std::marker::PhantomData;

use tracing::{debug, trace};

use wirechan_transport::Transport;

use crate::accumulator::ReceiveAccumulator;
use crate::contract::{Decoder, Encoder};
use crate::dispatch::{Dispatch, MessageSender};
use crate::error::{ChannelError, EncodeReject, Result};
use crate::value::{WireTag, WireValue};

/// Maximum number of arguments per message.
pub const MAX_ARGS: usize = 8;

/// Coordinates transport, encoder, decoder, and dispatch around one message
/// at a time.
///
/// The channel borrows its transport and is otherwise stateless: every
/// [`send`](Channel::send) and [`receive`](Channel::receive) owns a fresh
/// encoder or decoder/accumulator, so nothing survives between calls and a
/// failed exchange leaves no residue. It assumes one in-flight receive at a
/// time; concurrent send and receive are safe exactly when the transport is
/// full-duplex.
///
/// Handlers invoked during a receive see the channel as a
/// [`MessageSender`], which is how a reply goes out over the same
/// transport.
pub struct Channel<'t, T, E, D> {
    transport: &'t T,
    _codec: PhantomData<fn() -> (E, D)>,
}

impl<'t, T, E, D> Channel<'t, T, E, D>
where
    T: Transport,
    E: Encoder + Default,
    D: Decoder<ReceiveAccumulator> + Default,
{
    /// Create a channel over a borrowed transport.
    pub fn new(transport: &'t T) -> Self {
        Self {
            transport,
            _codec: PhantomData,
        }
    }

    /// The transport this channel sends and receives through.
    pub fn transport(&self) -> &T {
        self.transport
    }

    /// Encode and send one message. Returns the bytes accepted by the
    /// transport.
    ///
    /// Drives a fresh encoder through open, one `on_*` call per argument in
    /// order, `set_message_id`, `close`, then hands the finished buffer to
    /// the transport. The first refusal aborts with
    /// [`ChannelError::Encode`]. The argument cap is enforced before the
    /// encoder opens; see [`MAX_ARGS`].
    pub fn send(&self, msg_id: i32, args: &[WireValue]) -> Result<usize> {
        if args.len() > MAX_ARGS {
            return Err(ChannelError::TooManyArguments {
                count: args.len(),
                max: MAX_ARGS,
            });
        }

        let mut encoder = E::default();
        if !encoder.open(args.len()) {
            return Err(ChannelError::Encode(EncodeReject::Open));
        }

        for (index, arg) in args.iter().enumerate() {
            if !encode_argument(&mut encoder, arg) {
                return Err(ChannelError::Encode(EncodeReject::Argument {
                    index,
                    tag: arg.tag(),
                }));
            }
        }

        encoder.set_message_id(msg_id);
        if !encoder.close() {
            return Err(ChannelError::Encode(EncodeReject::Close));
        }

        let frame = encoder.buffer();
        if frame.is_empty() {
            return Err(ChannelError::Encode(EncodeReject::EmptyBuffer));
        }

        debug!(msg_id, args = args.len(), bytes = frame.len(), "sending message");
        Ok(self.transport.send(frame)?)
    }

    /// Receive one message and dispatch it. Returns the handler's result.
    ///
    /// Pulls chunks from the transport and feeds a fresh decoder until it
    /// terminates, then validates the argument cap, resolves the handler
    /// for the decoded message id, and invokes it with the accumulated
    /// arguments. Decode failure, cap overflow, and unroutable ids each
    /// surface as their own [`ChannelError`] variant, and none of them
    /// reach a handler.
    pub fn receive<P>(&self, dispatch: &P) -> Result<usize>
    where
        P: Dispatch + ?Sized,
    {
        let mut accumulator = ReceiveAccumulator::new();
        let mut decoder = D::default();

        loop {
            let chunk = self.transport.receive()?;
            trace!(bytes = chunk.len(), "feeding decoder");
            if !decoder.feed(&chunk, &mut accumulator) {
                break;
            }
        }

        if !decoder.succeeded() {
            return Err(ChannelError::DecodeFailed);
        }

        if accumulator.argument_count() > MAX_ARGS {
            return Err(ChannelError::TooManyArguments {
                count: accumulator.argument_count(),
                max: MAX_ARGS,
            });
        }

        // A decode that never announced a message start has no id to route.
        let msg_id = accumulator.message_id().ok_or(ChannelError::DecodeFailed)?;

        let handler = dispatch
            .handler_for(msg_id)
            .ok_or(ChannelError::Unroutable { msg_id })?;

        debug!(msg_id, args = accumulator.argument_count(), "dispatching message");
        handler.on_message_in(msg_id, self, accumulator.arguments())
    }
}

impl<T, E, D> MessageSender for Channel<'_, T, E, D>
where
    T: Transport,
    E: Encoder + Default,
    D: Decoder<ReceiveAccumulator> + Default,
{
    fn send(&self, msg_id: i32, args: &[WireValue]) -> Result<usize> {
        Channel::send(self, msg_id, args)
    }
}

/// Route one argument to the encoder call matching its tag.
///
/// `None` has no wire form and is always refused.
fn encode_argument<E: Encoder>(encoder: &mut E, arg: &WireValue) -> bool {
    match arg {
        WireValue::None => false,
        WireValue::Int32(v) => encoder.on_word(*v as u32, WireTag::Int32),
        WireValue::Uint32(v) => encoder.on_word(*v, WireTag::Uint32),
        WireValue::Char8(v) => encoder.on_word(u32::from(*v), WireTag::Char8),
        WireValue::Char16(v) => encoder.on_word(u32::from(*v), WireTag::Char16),
        WireValue::NullString8 => encoder.on_word(0, WireTag::NullString8),
        WireValue::NullString16 => encoder.on_word(0, WireTag::NullString16),
        WireValue::String8(bytes) => encoder.on_string8(bytes, WireTag::String8),
        WireValue::ByteArray(bytes) => encoder.on_string8(bytes, WireTag::ByteArray),
        WireValue::String16(units) => encoder.on_string16(units, WireTag::String16),
        WireValue::UnixFd(fd) => encoder.on_unix_fd(*fd, WireTag::UnixFd),
        WireValue::WinHandle(handle) => encoder.on_win_handle(*handle, WireTag::WinHandle),
    }
}
