//! Minimal echo server — accepts one peer and sends every message back.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --features cli -- send <printed socket path> \
//!     --id 7 --arg int32:42 --arg string8:ping --wait

use std::fs;

use wirechan::channel::{ChannelError, Dispatch, MessageHandler, MessageSender, WireValue};
use wirechan::codec::StreamChannel;
use wirechan::transport::{TransportError, UnixDomainSocket};

struct EchoAll {
    handler: EchoHandler,
}

struct EchoHandler;

impl Dispatch for EchoAll {
    fn handler_for(&self, _msg_id: i32) -> Option<&dyn MessageHandler> {
        Some(&self.handler)
    }
}

impl MessageHandler for EchoHandler {
    fn on_message_in(
        &self,
        msg_id: i32,
        channel: &dyn MessageSender,
        args: &[WireValue],
    ) -> wirechan::channel::Result<usize> {
        eprintln!("Echoing msg_id={msg_id} with {} arguments", args.len());
        channel.send(msg_id, args)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("wirechan-echo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("echo.sock");

    let listener = UnixDomainSocket::bind(&sock_path)?;
    eprintln!("Listening on {}", sock_path.display());

    // Accept one peer and echo messages until disconnect.
    let transport = listener.accept()?;
    eprintln!("Peer connected");

    let channel = StreamChannel::new(&transport);
    let dispatch = EchoAll {
        handler: EchoHandler,
    };

    loop {
        match channel.receive(&dispatch) {
            Ok(_) => {}
            Err(ChannelError::Transport(TransportError::Disconnected)) => {
                eprintln!("Peer disconnected");
                break;
            }
            Err(e) => {
                eprintln!("Receive failed: {e}");
                break;
            }
        }
    }

    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
