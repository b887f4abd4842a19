use bytes::Bytes;

use crate::error::Result;

/// A connected, message-oriented byte mover.
///
/// One [`send`](Transport::send) delivers one complete message to the peer.
/// [`receive`](Transport::receive) hands back the next available chunk of an
/// in-flight message; implementations that preserve message boundaries return
/// whole messages as single chunks, while callers that reassemble from byte
/// streams may see a message arrive in pieces.
///
/// An EMPTY chunk from `receive` means the transport will deliver no more
/// data for the current exchange (a read timeout elapsed, or the peer has
/// nothing further to say). A peer that is gone for good is reported as
/// [`TransportError::Disconnected`](crate::TransportError::Disconnected)
/// instead.
///
/// Both methods take `&self` so implementations can support concurrent
/// send/receive from different threads where the underlying mechanism is
/// full-duplex.
pub trait Transport {
    /// Send one complete message. Returns the message length on success.
    fn send(&self, message: &[u8]) -> Result<usize>;

    /// Receive the next chunk of incoming data (blocking).
    fn receive(&self) -> Result<Bytes>;
}
