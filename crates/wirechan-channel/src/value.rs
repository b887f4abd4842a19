use bytes::Bytes;

/// Wire type tag. One per [`WireValue`] variant, with stable discriminants
/// for codecs that put the tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireTag {
    None = 0,
    Int32 = 1,
    Uint32 = 2,
    Char8 = 3,
    Char16 = 4,
    NullString8 = 5,
    NullString16 = 6,
    String8 = 7,
    ByteArray = 8,
    String16 = 9,
    UnixFd = 10,
    WinHandle = 11,
}

impl WireTag {
    /// Map a raw tag byte back to a tag. Unknown bytes yield `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Int32),
            2 => Some(Self::Uint32),
            3 => Some(Self::Char8),
            4 => Some(Self::Char16),
            5 => Some(Self::NullString8),
            6 => Some(Self::NullString16),
            7 => Some(Self::String8),
            8 => Some(Self::ByteArray),
            9 => Some(Self::String16),
            10 => Some(Self::UnixFd),
            11 => Some(Self::WinHandle),
            _ => None,
        }
    }

    /// The raw tag byte.
    pub fn as_raw(self) -> u8 {
        self as u8
    }

    /// Whether the tag belongs to the fixed-width word category
    /// (scalars and null-string markers, all carried as 32 bits).
    pub fn is_word(self) -> bool {
        matches!(
            self,
            Self::Int32
                | Self::Uint32
                | Self::Char8
                | Self::Char16
                | Self::NullString8
                | Self::NullString16
        )
    }

    /// Stable lowercase name, used in diagnostics and CLI argument specs.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Char8 => "char8",
            Self::Char16 => "char16",
            Self::NullString8 => "null-string8",
            Self::NullString16 => "null-string16",
            Self::String8 => "string8",
            Self::ByteArray => "byte-array",
            Self::String16 => "string16",
            Self::UnixFd => "unix-fd",
            Self::WinHandle => "win-handle",
        }
    }
}

impl std::fmt::Display for WireTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed argument of a message.
///
/// Exactly one variant is active and the tag fully determines the payload,
/// so a wrong-variant access is unrepresentable. The `as_*` accessors return
/// `None` for non-matching variants.
///
/// The null-string variants are explicit absent-string markers, distinct
/// from empty strings; they carry no bytes and round-trip by tag.
///
/// A value owns nothing beyond its bytes. Fd and handle variants carry the
/// numeric value only; closing the underlying resource stays with the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    None,
    Int32(i32),
    Uint32(u32),
    Char8(u8),
    Char16(u16),
    NullString8,
    NullString16,
    String8(Bytes),
    ByteArray(Bytes),
    String16(Vec<u16>),
    UnixFd(i32),
    WinHandle(u64),
}

impl WireValue {
    /// Build a `String8` from anything convertible to [`Bytes`].
    pub fn string8(bytes: impl Into<Bytes>) -> Self {
        Self::String8(bytes.into())
    }

    /// Build a `String8` by copying a `&str`'s bytes.
    pub fn string8_from_str(s: &str) -> Self {
        Self::String8(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Build a `ByteArray` from anything convertible to [`Bytes`].
    pub fn byte_array(bytes: impl Into<Bytes>) -> Self {
        Self::ByteArray(bytes.into())
    }

    /// Build a `String16` from 16-bit units.
    pub fn string16(units: impl Into<Vec<u16>>) -> Self {
        Self::String16(units.into())
    }

    /// Build a `String16` by UTF-16-encoding a `&str`.
    pub fn string16_from_str(s: &str) -> Self {
        Self::String16(s.encode_utf16().collect())
    }

    /// The active variant's tag.
    pub fn tag(&self) -> WireTag {
        match self {
            Self::None => WireTag::None,
            Self::Int32(_) => WireTag::Int32,
            Self::Uint32(_) => WireTag::Uint32,
            Self::Char8(_) => WireTag::Char8,
            Self::Char16(_) => WireTag::Char16,
            Self::NullString8 => WireTag::NullString8,
            Self::NullString16 => WireTag::NullString16,
            Self::String8(_) => WireTag::String8,
            Self::ByteArray(_) => WireTag::ByteArray,
            Self::String16(_) => WireTag::String16,
            Self::UnixFd(_) => WireTag::UnixFd,
            Self::WinHandle(_) => WireTag::WinHandle,
        }
    }

    /// The raw 32-bit representation of word-category values.
    ///
    /// Null-string markers carry zero bits. `None` for every other variant.
    pub fn word_bits(&self) -> Option<u32> {
        match self {
            Self::Int32(v) => Some(*v as u32),
            Self::Uint32(v) => Some(*v),
            Self::Char8(v) => Some(u32::from(*v)),
            Self::Char16(v) => Some(u32::from(*v)),
            Self::NullString8 | Self::NullString16 => Some(0),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char8(&self) -> Option<u8> {
        match self {
            Self::Char8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char16(&self) -> Option<u16> {
        match self {
            Self::Char16(v) => Some(*v),
            _ => None,
        }
    }

    /// The 8-bit-unit payload of a `String8` or `ByteArray`.
    ///
    /// Both variants share one accessor so codecs can hand either to the
    /// same byte-bearing call, keyed by [`tag`](Self::tag).
    pub fn as_string8(&self) -> Option<&[u8]> {
        match self {
            Self::String8(bytes) | Self::ByteArray(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The 16-bit units of a `String16`.
    pub fn as_string16(&self) -> Option<&[u16]> {
        match self {
            Self::String16(units) => Some(units),
            _ => None,
        }
    }

    pub fn as_unix_fd(&self) -> Option<i32> {
        match self {
            Self::UnixFd(fd) => Some(*fd),
            _ => None,
        }
    }

    pub fn as_win_handle(&self) -> Option<u64> {
        match self {
            Self::WinHandle(handle) => Some(*handle),
            _ => None,
        }
    }
}
