use std::collections::HashMap;

use crate::error::Result;
use crate::value::WireValue;

/// The sending half of a channel.
///
/// This is the view a handler gets of the channel its message arrived on:
/// enough to reply, nothing more. Replies go back through the same send
/// path and the same error taxonomy as any other message.
pub trait MessageSender {
    /// Encode and send one message. Returns the bytes accepted by the
    /// transport.
    fn send(&self, msg_id: i32, args: &[WireValue]) -> Result<usize>;
}

/// Processes one delivered message.
///
/// The returned count propagates as the receive result.
pub trait MessageHandler {
    fn on_message_in(
        &self,
        msg_id: i32,
        channel: &dyn MessageSender,
        args: &[WireValue],
    ) -> Result<usize>;
}

impl<F> MessageHandler for F
where
    F: Fn(i32, &dyn MessageSender, &[WireValue]) -> Result<usize>,
{
    fn on_message_in(
        &self,
        msg_id: i32,
        channel: &dyn MessageSender,
        args: &[WireValue],
    ) -> Result<usize> {
        self(msg_id, channel, args)
    }
}

/// Resolves a handler for a message id.
pub trait Dispatch {
    /// The handler for `msg_id`, or `None` when the id is unroutable.
    fn handler_for(&self, msg_id: i32) -> Option<&dyn MessageHandler>;
}

/// Message-id-keyed registry of boxed handlers.
///
/// The ready-made [`Dispatch`] implementation. Closures with the matching
/// signature register directly.
#[derive(Default)]
pub struct DispatchRegistry {
    handlers: HashMap<i32, Box<dyn MessageHandler>>,
}

impl DispatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a message id, replacing any previous one.
    pub fn register(&mut self, msg_id: i32, handler: impl MessageHandler + 'static) {
        self.handlers.insert(msg_id, Box::new(handler));
    }

    /// Remove the handler for a message id. Returns whether one existed.
    pub fn unregister(&mut self, msg_id: i32) -> bool {
        self.handlers.remove(&msg_id).is_some()
    }

    /// Check if a message id has a registered handler.
    pub fn contains(&self, msg_id: i32) -> bool {
        self.handlers.contains_key(&msg_id)
    }

    /// Get message ids that have registered handlers.
    pub fn message_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.handlers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Dispatch for DispatchRegistry {
    fn handler_for(&self, msg_id: i32) -> Option<&dyn MessageHandler> {
        self.handlers.get(&msg_id).map(|handler| handler.as_ref())
    }
}
