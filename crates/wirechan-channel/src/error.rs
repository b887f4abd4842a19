use crate::value::WireTag;

/// Errors that can occur during channel send/receive.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The encoder refused part of the outgoing message.
    #[error("encoder rejected message: {0}")]
    Encode(EncodeReject),

    /// The underlying transport failed.
    #[error("transport failure: {0}")]
    Transport(#[from] wirechan_transport::TransportError),

    /// The decoder terminated without assembling a valid message.
    #[error("decode failed: received bytes did not form a valid message")]
    DecodeFailed,

    /// The message carries more arguments than the channel permits.
    #[error("too many arguments ({count}, max {max})")]
    TooManyArguments { count: usize, max: usize },

    /// No dispatch handler is registered for the decoded message id.
    #[error("no handler registered for message id {msg_id}")]
    Unroutable { msg_id: i32 },
}

/// Which encoding step the encoder refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeReject {
    /// `open` returned failure.
    Open,
    /// The argument at `index` (carrying `tag`) was refused.
    Argument { index: usize, tag: WireTag },
    /// `close` returned failure.
    Close,
    /// The encoder produced no buffer.
    EmptyBuffer,
}

impl std::fmt::Display for EncodeReject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open refused"),
            Self::Argument { index, tag } => {
                write!(f, "argument {index} ({tag}) refused")
            }
            Self::Close => write!(f, "close refused"),
            Self::EmptyBuffer => write!(f, "no buffer produced"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
