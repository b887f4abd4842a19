//! Typed-arguments example — round-trips a full eight-argument message
//! over an in-memory transport pair.
//!
//! Run with:
//!   cargo run --example typed-args

use std::thread;

use wirechan::channel::{DispatchRegistry, MessageSender, WireValue};
use wirechan::codec::StreamChannel;
use wirechan::transport::MemoryTransport;

const MSG_INVENTORY: i32 = 1;
const MSG_DONE: i32 = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (client_end, server_end) = MemoryTransport::pair();

    let server = thread::spawn(move || -> wirechan::channel::Result<()> {
        let channel = StreamChannel::new(&server_end);

        let mut registry = DispatchRegistry::new();
        registry.register(
            MSG_INVENTORY,
            |msg_id: i32, chan: &dyn MessageSender, args: &[WireValue]| {
                for (index, arg) in args.iter().enumerate() {
                    eprintln!("[server] arg {index}: {} = {arg:?}", arg.tag());
                }
                // Acknowledge with the argument count.
                chan.send(MSG_DONE, &[WireValue::Uint32(args.len() as u32)])?;
                Ok(msg_id as usize)
            },
        );

        channel.receive(&registry)?;
        Ok(())
    });

    let channel = StreamChannel::new(&client_end);
    channel.send(
        MSG_INVENTORY,
        &[
            WireValue::Int32(-42),
            WireValue::Uint32(42),
            WireValue::Char8(b'w'),
            WireValue::Char16(0x2603),
            WireValue::NullString8,
            WireValue::string8_from_str("eight bits"),
            WireValue::byte_array(vec![0xde, 0xad, 0xbe, 0xef]),
            WireValue::string16_from_str("sixteen bits"),
        ],
    )?;

    let mut registry = DispatchRegistry::new();
    registry.register(
        MSG_DONE,
        |_: i32, _: &dyn MessageSender, args: &[WireValue]| {
            eprintln!("[client] server handled {:?} arguments", args[0].as_u32());
            Ok(args.len())
        },
    );
    channel.receive(&registry)?;

    server
        .join()
        .expect("server thread should not panic")
        .expect("server should complete without error");
    Ok(())
}
