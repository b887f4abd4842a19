use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wirechan_channel::{
    ChannelError, Dispatch, MessageHandler, MessageSender, Result, WireValue,
};
use wirechan_codec::StreamChannel;
use wirechan_transport::{TransportError, UnixDomainSocket};

use crate::cmd::EchoArgs;
use crate::exit::{channel_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::OutputFormat;

/// Routes every message id to a handler that sends the same message back.
struct EchoDispatch {
    handler: EchoHandler,
}

struct EchoHandler;

impl Dispatch for EchoDispatch {
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
    ) -> Result<usize> {
        tracing::info!(msg_id, args = args.len(), "echoing message");
        channel.send(msg_id, args)
    }
}

pub fn run(args: EchoArgs, _format: OutputFormat) -> CliResult<i32> {
    let listener =
        UnixDomainSocket::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let dispatch = EchoDispatch {
        handler: EchoHandler,
    };

    while running.load(Ordering::SeqCst) {
        let transport = match listener.accept() {
            Ok(transport) => transport,
            Err(err) => return Err(transport_error("accept failed", err)),
        };
        let channel = StreamChannel::new(&transport);

        while running.load(Ordering::SeqCst) {
            match channel.receive(&dispatch) {
                Ok(_) => {}
                Err(ChannelError::Transport(TransportError::Disconnected)) => break,
                Err(err @ ChannelError::DecodeFailed)
                | Err(err @ ChannelError::TooManyArguments { .. }) => {
                    tracing::warn!(error = %err, "dropping undecodable message");
                }
                Err(err) => return Err(channel_error("receive failed", err)),
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
