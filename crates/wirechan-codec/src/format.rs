//! Frame layout shared by the encoder and decoder.
//!
//! A frame is a fixed header followed by a body of tagged argument
//! records:
//!
//! ```text
//! ┌──────────────┬─────────┬───────────┬──────────┬───────────┬────────────────┐
//! │ Magic (2B)   │ Version │ Arg count │ Msg id   │ Body len  │ Body            │
//! │ 0x57 0x43    │ (1B)    │ (1B)      │ (4B LE)  │ (4B LE)   │ (len bytes)     │
//! │ "WC"         │ 0x01    │           │ i32      │           │                 │
//! └──────────────┴─────────┴───────────┴──────────┴───────────┴────────────────┘
//! ```
//!
//! Each body record starts with the argument's tag byte. Word-sized tags
//! (int32, uint32, char8, char16 and the null-string markers) carry their
//! value as a u32 LE. String8 and byte-array records carry a u32 LE byte
//! length followed by the bytes; string16 records carry a u32 LE unit
//! count followed by that many u16 LE code units. Unix fd records carry
//! an i32 LE and Windows handle records a u64 LE.

/// Frame header: magic (2) + version (1) + arg count (1) + msg id (4) +
/// body length (4) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// Magic bytes: "WC" (0x57 0x43).
pub const MAGIC: [u8; 2] = [0x57, 0x43];

/// Current frame format version.
pub const VERSION: u8 = 0x01;

/// Default maximum body size: 16 MiB.
pub const DEFAULT_MAX_BODY: usize = 16 * 1024 * 1024;

/// Most arguments one frame can describe. The count travels as a single
/// byte, so this is a property of the format, not a policy knob.
pub const MAX_WIRE_ARGS: usize = u8::MAX as usize;
