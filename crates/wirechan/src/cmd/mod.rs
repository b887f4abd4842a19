use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod echo;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one message.
    Send(SendArgs),
    /// Listen and print received messages.
    Listen(ListenArgs),
    /// Start an echo server that replies with the received arguments.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Echo(args) => echo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
    /// Message id.
    #[arg(long, short = 'i')]
    pub id: i32,
    /// Typed argument spec, repeatable, in argument order.
    /// Forms: int32:N, uint32:N, char8:C, char16:C, string8:TEXT,
    /// string16:TEXT, bytes:HEX, fd:N, handle:N, null8, null16.
    #[arg(long = "arg", value_name = "SPEC")]
    pub args: Vec<String>,
    /// Wait for one reply message and print it.
    #[arg(long)]
    pub wait: bool,
    /// Receive timeout when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Socket path to bind.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
