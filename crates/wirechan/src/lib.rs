//! Typed message channels for inter-process communication.
//!
//! wirechan moves messages made of an `i32` id and up to eight tagged
//! arguments between processes, over any byte transport, and routes each
//! received message to a per-id handler.
//!
//! # Crate Structure
//!
//! - [`transport`] — Byte movers: the `Transport` trait plus in-memory,
//!   stream, and Unix-domain-socket implementations
//! - [`channel`] — The channel core: `WireValue` tagged arguments, the
//!   encoder/decoder contracts, send/receive orchestration, and dispatch
//! - [`codec`] — The reference tag/value wire codec and the
//!   `StreamChannel` alias binding a channel to it

/// Re-export transport types.
pub mod transport {
    pub use wirechan_transport::*;
}

/// Re-export channel types.
pub mod channel {
    pub use wirechan_channel::*;
}

/// Re-export codec types.
pub mod codec {
    pub use wirechan_codec::*;
}
