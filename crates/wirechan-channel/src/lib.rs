//! Typed message channel over any [`Transport`](wirechan_transport::Transport).
//!
//! This is the core value-add layer of wirechan. A message is an ordered
//! list of tagged [`WireValue`] arguments plus an `i32` message id; the
//! [`Channel`] serializes it through an [`Encoder`], moves the bytes through
//! the transport, reassembles it on the far side through a [`Decoder`]
//! feeding a [`ReceiveAccumulator`], and routes it to the handler a
//! [`Dispatch`] resolves for the message id.
//!
//! The byte format lives entirely in the codec: this crate defines the
//! contracts ([`Encoder`], [`Decoder`], [`DecodeHandler`]) and orchestrates
//! them, but never touches wire bytes itself.

pub mod accumulator;
pub mod channel;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod value;

pub use accumulator::ReceiveAccumulator;
pub use channel::{Channel, MAX_ARGS};
pub use contract::{DecodeHandler, Decoder, Encoder};
pub use dispatch::{Dispatch, DispatchRegistry, MessageHandler, MessageSender};
pub use error::{ChannelError, EncodeReject, Result};
pub use value::{WireTag, WireValue};
