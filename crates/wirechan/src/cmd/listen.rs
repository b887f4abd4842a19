use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wirechan_channel::ChannelError;
use wirechan_codec::StreamChannel;
use wirechan_transport::{TransportError, UnixDomainSocket};

use crate::cmd::ListenArgs;
use crate::exit::{channel_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{OutputFormat, PrintDispatch};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener =
        UnixDomainSocket::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let printer = PrintDispatch::new(format);
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let transport = match listener.accept() {
            Ok(transport) => transport,
            Err(err) => return Err(transport_error("accept failed", err)),
        };
        let channel = StreamChannel::new(&transport);

        while running.load(Ordering::SeqCst) {
            match channel.receive(&printer) {
                Ok(_) => {
                    printed = printed.saturating_add(1);
                    if let Some(count) = args.count {
                        if printed >= count {
                            return Ok(SUCCESS);
                        }
                    }
                }
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
