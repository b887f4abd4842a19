use std::time::Duration;

use wirechan_channel::WireValue;
use wirechan_codec::StreamChannel;
use wirechan_transport::{StreamConfig, UnixDomainSocket};

use crate::cmd::SendArgs;
use crate::exit::{channel_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{OutputFormat, PrintDispatch};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let values = args
        .args
        .iter()
        .map(|spec| parse_arg_spec(spec))
        .collect::<CliResult<Vec<_>>>()?;

    let config = StreamConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..StreamConfig::default()
    };
    let transport = UnixDomainSocket::connect_with_config(&args.path, config)
        .map_err(|err| transport_error("connect failed", err))?;
    let channel = StreamChannel::new(&transport);

    let sent = channel
        .send(args.id, &values)
        .map_err(|err| channel_error("send failed", err))?;
    tracing::debug!(msg_id = args.id, bytes = sent, "message sent");

    if args.wait {
        let printer = PrintDispatch::new(format);
        channel
            .receive(&printer)
            .map_err(|err| channel_error("receive failed", err))?;
    }

    Ok(SUCCESS)
}

/// Parse one `TAG[:VALUE]` argument spec into a [`WireValue`].
fn parse_arg_spec(spec: &str) -> CliResult<WireValue> {
    match spec {
        "null8" => return Ok(WireValue::NullString8),
        "null16" => return Ok(WireValue::NullString16),
        _ => {}
    }

    let (tag, value) = spec
        .split_once(':')
        .ok_or_else(|| CliError::new(USAGE, format!("argument spec needs TAG:VALUE: {spec}")))?;

    match tag {
        "int32" => value
            .parse::<i32>()
            .map(WireValue::Int32)
            .map_err(|_| bad_value(spec)),
        "uint32" => value
            .parse::<u32>()
            .map(WireValue::Uint32)
            .map_err(|_| bad_value(spec)),
        "char8" => parse_char8(value).map(WireValue::Char8).ok_or_else(|| bad_value(spec)),
        "char16" => parse_char16(value)
            .map(WireValue::Char16)
            .ok_or_else(|| bad_value(spec)),
        "string8" => Ok(WireValue::string8_from_str(value)),
        "string16" => Ok(WireValue::string16_from_str(value)),
        "bytes" => parse_hex(value)
            .map(WireValue::byte_array)
            .ok_or_else(|| CliError::new(USAGE, format!("bytes spec needs hex digits: {spec}"))),
        "fd" => value
            .parse::<i32>()
            .map(WireValue::UnixFd)
            .map_err(|_| bad_value(spec)),
        "handle" => parse_u64(value)
            .map(WireValue::WinHandle)
            .ok_or_else(|| bad_value(spec)),
        other => Err(CliError::new(
            USAGE,
            format!("unknown argument tag: {other}"),
        )),
    }
}

fn bad_value(spec: &str) -> CliError {
    CliError::new(USAGE, format!("invalid argument value: {spec}"))
}

/// A single ASCII character, or a numeric byte value.
fn parse_char8(value: &str) -> Option<u8> {
    let mut chars = value.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii() {
            return Some(c as u8);
        }
    }
    value.parse::<u8>().ok()
}

/// A single BMP character, or a numeric code unit.
fn parse_char16(value: &str) -> Option<u16> {
    let mut chars = value.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let mut units = [0u16; 2];
        if let [unit] = c.encode_utf16(&mut units) {
            return Some(*unit);
        }
    }
    value.parse::<u16>().ok()
}

fn parse_u64(value: &str) -> Option<u64> {
    if let Some(hex) = value.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        value.parse::<u64>().ok()
    }
}

fn parse_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 {
        return None;
    }
    value
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(text, 16).ok()
        })
        .collect()
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}
