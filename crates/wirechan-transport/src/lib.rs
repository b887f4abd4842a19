//! Message-oriented IPC transports.
//!
//! Provides the [`Transport`] seam the channel layer sends and receives
//! through, plus ready-made implementations:
//! - [`MemoryTransport`]: in-process connected pair
//! - [`StreamTransport`]: any `Read`/`Write` pair, with envelope framing to
//!   preserve message boundaries
//! - [`UnixDomainSocket`]: UDS listener/connector (Linux/macOS)
//!
//! This is the lowest layer of wirechan. Everything else builds on top of
//! the [`Transport`] trait provided here.

pub mod envelope;
pub mod error;
pub mod memory;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use envelope::{StreamConfig, DEFAULT_MAX_MESSAGE};
pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use stream::StreamTransport;
pub use traits::Transport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
