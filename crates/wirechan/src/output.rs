use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wirechan_channel::{Dispatch, MessageHandler, MessageSender, Result, WireValue};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput {
    schema_id: &'static str,
    msg_id: i32,
    argument_count: usize,
    arguments: Vec<ArgumentOutput>,
    timestamp: String,
}

#[derive(Serialize)]
struct ArgumentOutput {
    tag: &'static str,
    value: serde_json::Value,
}

pub fn print_message(msg_id: i32, args: &[WireValue], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                schema_id: "https://schemas.wirechan.dev/cli/v1/message-received.schema.json",
                msg_id,
                argument_count: args.len(),
                arguments: args
                    .iter()
                    .map(|arg| ArgumentOutput {
                        tag: arg.tag().name(),
                        value: argument_json(arg),
                    })
                    .collect(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MSG ID", "ARGS", "ARGUMENTS"])
                .add_row(vec![
                    msg_id.to_string(),
                    args.len().to_string(),
                    arguments_preview(args),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "msg_id={} args={} [{}]",
                msg_id,
                args.len(),
                arguments_preview(args)
            );
        }
        OutputFormat::Raw => {
            // Raw mode emits the 8-bit payloads only, back to back.
            let mut out = std::io::stdout();
            for arg in args {
                if let Some(bytes) = arg.as_string8() {
                    let _ = out.write_all(bytes);
                }
            }
            let _ = out.flush();
        }
    }
}

/// Routes every message id to a handler that prints the message.
///
/// The listen command accepts whatever arrives rather than keeping a
/// registry, so its dispatch is total by construction.
pub struct PrintDispatch {
    handler: PrintHandler,
}

struct PrintHandler {
    format: OutputFormat,
}

impl PrintDispatch {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            handler: PrintHandler { format },
        }
    }
}

impl Dispatch for PrintDispatch {
    fn handler_for(&self, _msg_id: i32) -> Option<&dyn MessageHandler> {
        Some(&self.handler)
    }
}

impl MessageHandler for PrintHandler {
    fn on_message_in(
        &self,
        msg_id: i32,
        _channel: &dyn MessageSender,
        args: &[WireValue],
    ) -> Result<usize> {
        print_message(msg_id, args, self.format);
        Ok(args.len())
    }
}

fn argument_json(arg: &WireValue) -> serde_json::Value {
    match arg {
        WireValue::None | WireValue::NullString8 | WireValue::NullString16 => {
            serde_json::Value::Null
        }
        WireValue::Int32(v) => serde_json::json!(v),
        WireValue::Uint32(v) => serde_json::json!(v),
        WireValue::Char8(v) => serde_json::json!(v),
        WireValue::Char16(v) => serde_json::json!(v),
        WireValue::String8(bytes) => serde_json::json!(String::from_utf8_lossy(bytes)),
        WireValue::ByteArray(bytes) => serde_json::json!(hex_string(bytes)),
        WireValue::String16(units) => serde_json::json!(String::from_utf16_lossy(units)),
        WireValue::UnixFd(fd) => serde_json::json!(fd),
        WireValue::WinHandle(handle) => serde_json::json!(handle),
    }
}

fn arguments_preview(args: &[WireValue]) -> String {
    args.iter()
        .map(|arg| format!("{}={}", arg.tag().name(), value_preview(arg)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn value_preview(arg: &WireValue) -> String {
    match arg {
        WireValue::None | WireValue::NullString8 | WireValue::NullString16 => "null".to_string(),
        WireValue::Int32(v) => v.to_string(),
        WireValue::Uint32(v) => v.to_string(),
        WireValue::Char8(v) => v.to_string(),
        WireValue::Char16(v) => v.to_string(),
        WireValue::String8(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => format!("<binary {} bytes>", bytes.len()),
        },
        WireValue::ByteArray(bytes) => hex_string(bytes),
        WireValue::String16(units) => String::from_utf16_lossy(units),
        WireValue::UnixFd(fd) => fd.to_string(),
        WireValue::WinHandle(handle) => format!("{handle:#x}"),
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
