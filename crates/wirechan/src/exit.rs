use std::fmt;
use std::io;

use wirechan_channel::ChannelError;
use wirechan_transport::TransportError;

// Exit code constants shared by every subcommand.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    match err {
        ChannelError::Transport(err) => transport_error(context, err),
        ChannelError::Encode(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        ChannelError::DecodeFailed => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        ChannelError::TooManyArguments { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        ChannelError::Unroutable { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_io_errors_map_to_timeout_code() {
        let err = io_error("receive failed", io::Error::from(io::ErrorKind::TimedOut));
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn channel_cap_overflow_is_a_usage_error() {
        let err = channel_error(
            "send failed",
            ChannelError::TooManyArguments { count: 9, max: 8 },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn transport_failures_unwrap_to_io_codes() {
        let err = channel_error(
            "send failed",
            ChannelError::Transport(TransportError::Disconnected),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
