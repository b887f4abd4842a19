use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// An in-process transport pair connected back to back.
///
/// Messages sent on one endpoint become receivable on the other, whole and
/// in order. Useful for tests and same-process wiring without sockets.
///
/// Dropping an endpoint closes both directions: the peer's pending messages
/// remain receivable, after which `receive` yields the empty chunk and
/// `send` reports [`TransportError::Disconnected`].
pub struct MemoryTransport {
    outbound: Arc<Mailbox>,
    inbound: Arc<Mailbox>,
}

struct Mailbox {
    state: Mutex<MailboxState>,
    ready: Condvar,
}

#[derive(Default)]
struct MailboxState {
    messages: VecDeque<Bytes>,
    closed: bool,
}

impl Mailbox {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MailboxState::default()),
            ready: Condvar::new(),
        })
    }

    fn push(&self, message: Bytes) -> Result<()> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(TransportError::Disconnected);
        }
        state.messages.push_back(message);
        self.ready.notify_one();
        Ok(())
    }

    fn pop(&self) -> Bytes {
        let mut state = lock(&self.state);
        loop {
            if let Some(message) = state.messages.pop_front() {
                return message;
            }
            if state.closed {
                // Closed and drained: no more data will ever arrive.
                return Bytes::new();
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn close(&self) {
        lock(&self.state).closed = true;
        self.ready.notify_all();
    }
}

impl MemoryTransport {
    /// Create a connected pair of in-memory transports.
    pub fn pair() -> (Self, Self) {
        let a_to_b = Mailbox::new();
        let b_to_a = Mailbox::new();
        (
            Self {
                outbound: Arc::clone(&a_to_b),
                inbound: Arc::clone(&b_to_a),
            },
            Self {
                outbound: b_to_a,
                inbound: a_to_b,
            },
        )
    }
}

impl Transport for MemoryTransport {
    fn send(&self, message: &[u8]) -> Result<usize> {
        self.outbound.push(Bytes::copy_from_slice(message))?;
        Ok(message.len())
    }

    fn receive(&self) -> Result<Bytes> {
        Ok(self.inbound.pop())
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.outbound.close();
        self.inbound.close();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_roundtrip() {
        let (a, b) = MemoryTransport::pair();

        a.send(b"hello").unwrap();
        assert_eq!(b.receive().unwrap().as_ref(), b"hello");

        b.send(b"reply").unwrap();
        assert_eq!(a.receive().unwrap().as_ref(), b"reply");
    }

    #[test]
    fn preserves_message_boundaries() {
        let (a, b) = MemoryTransport::pair();

        a.send(b"first").unwrap();
        a.send(b"second").unwrap();

        assert_eq!(b.receive().unwrap().as_ref(), b"first");
        assert_eq!(b.receive().unwrap().as_ref(), b"second");
    }

    #[test]
    fn receive_blocks_until_send() {
        let (a, b) = MemoryTransport::pair();

        let sender = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            a.send(b"late").unwrap();
            a
        });

        assert_eq!(b.receive().unwrap().as_ref(), b"late");
        drop(sender.join().unwrap());
    }

    #[test]
    fn drop_yields_empty_chunk_after_drain() {
        let (a, b) = MemoryTransport::pair();

        a.send(b"last words").unwrap();
        drop(a);

        assert_eq!(b.receive().unwrap().as_ref(), b"last words");
        assert!(b.receive().unwrap().is_empty());
    }

    #[test]
    fn send_after_peer_drop_fails() {
        let (a, b) = MemoryTransport::pair();
        drop(b);

        let err = a.send(b"into the void").unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[test]
    fn drop_unblocks_pending_receive() {
        let (a, b) = MemoryTransport::pair();

        let receiver = std::thread::spawn(move || b.receive().unwrap());

        std::thread::sleep(std::time::Duration::from_millis(20));
        drop(a);

        assert!(receiver.join().unwrap().is_empty());
    }
}
