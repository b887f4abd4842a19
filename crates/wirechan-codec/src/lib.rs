//! Reference wire codec for wirechan message channels.
//!
//! Implements the channel's [`Encoder`] and [`Decoder`] contracts with a
//! compact tagged binary format. Every frame carries:
//! - A 2-byte magic number ("WC") and a format version byte
//! - The argument count and the i32 message id
//! - A 4-byte little-endian body length, then one tagged record per argument
//!
//! The codec is one implementation of the contracts, not the only one;
//! channels accept any encoder/decoder pair. [`StreamChannel`] fixes a
//! channel to this codec for callers that just want messages moving.
//!
//! [`Encoder`]: wirechan_channel::Encoder
//! [`Decoder`]: wirechan_channel::Decoder

pub mod decoder;
pub mod encoder;
pub mod format;

pub use decoder::WireDecoder;
pub use encoder::WireEncoder;
pub use format::{DEFAULT_MAX_BODY, HEADER_SIZE, MAGIC, MAX_WIRE_ARGS, VERSION};

use wirechan_channel::Channel;

/// A message channel using the reference codec.
pub type StreamChannel<'t, T> = Channel<'t, T, WireEncoder, WireDecoder>;
