#![cfg(all(unix, feature = "cli"))]

use std::io;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use wirechan::channel::{DispatchRegistry, MessageSender, WireValue};
use wirechan::codec::StreamChannel;
use wirechan::transport::{StreamTransport, UnixDomainSocket};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/wccli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_connect(
    path: &Path,
    timeout: Duration,
) -> io::Result<StreamTransport<UnixStream, UnixStream>> {
    let start = Instant::now();
    loop {
        match UnixDomainSocket::connect(path) {
            Ok(transport) => return Ok(transport),
            Err(err) => {
                if start.elapsed() >= timeout {
                    return Err(io::Error::other(format!("connect timeout: {err}")));
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

#[test]
fn echo_command_replies_with_same_arguments() {
    let dir = unique_temp_dir("echo");
    let sock_path = dir.join("echo.sock");

    let mut child = Command::new(env!("CARGO_BIN_EXE_wirechan"))
        .arg("--log-level")
        .arg("error")
        .arg("echo")
        .arg(&sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("echo command should start");

    let transport = wait_for_connect(&sock_path, Duration::from_secs(3))
        .expect("client should connect to echo server");
    let channel = StreamChannel::new(&transport);

    let args = [
        WireValue::Int32(42),
        WireValue::string8_from_str("ping"),
        WireValue::NullString8,
    ];
    channel.send(9, &args).expect("request should send");

    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    let mut registry = DispatchRegistry::new();
    registry.register(
        9,
        move |_: i32, _: &dyn MessageSender, args: &[WireValue]| {
            *sink.lock().expect("capture lock should not be poisoned") = args.to_vec();
            Ok(args.len())
        },
    );
    channel.receive(&registry).expect("echo reply should arrive");
    assert_eq!(captured.lock().unwrap().as_slice(), &args);

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_command_delivers_typed_arguments() {
    let dir = unique_temp_dir("send");
    let sock_path = dir.join("send.sock");

    let listener = UnixDomainSocket::bind(&sock_path).expect("bind should succeed");

    let mut child = Command::new(env!("CARGO_BIN_EXE_wirechan"))
        .arg("--log-level")
        .arg("error")
        .arg("send")
        .arg(&sock_path)
        .arg("--id")
        .arg("7")
        .arg("--arg")
        .arg("int32:42")
        .arg("--arg")
        .arg("string8:ping")
        .arg("--arg")
        .arg("bytes:c0ffee")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("send command should start");

    let transport = listener.accept().expect("accept should succeed");
    let channel = StreamChannel::new(&transport);

    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    let mut registry = DispatchRegistry::new();
    registry.register(
        7,
        move |_: i32, _: &dyn MessageSender, args: &[WireValue]| {
            *sink.lock().expect("capture lock should not be poisoned") = args.to_vec();
            Ok(args.len())
        },
    );
    channel.receive(&registry).expect("message should arrive");
    assert_eq!(
        captured.lock().unwrap().as_slice(),
        &[
            WireValue::Int32(42),
            WireValue::string8_from_str("ping"),
            WireValue::byte_array(vec![0xc0, 0xff, 0xee]),
        ]
    );

    let status = child.wait().expect("send command should exit");
    assert!(status.success(), "send command should exit zero");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_command_reports_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_wirechan"))
        .arg("version")
        .output()
        .expect("version command should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wirechan"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
