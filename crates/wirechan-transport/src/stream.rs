use std::io::{ErrorKind, Read, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::{Bytes, BytesMut};

use crate::envelope::{decode_envelope, encode_envelope, StreamConfig, HEADER_SIZE};
use crate::error::{Result, TransportError};
use crate::traits::Transport;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// A message-oriented transport over any `Read`/`Write` pair.
///
/// Wraps every outgoing message in the stream envelope and reassembles
/// incoming envelopes, so callers deal in whole messages even though the
/// underlying stream has no boundaries. Partial envelope bytes buffer inside
/// the transport between `receive` calls.
///
/// The read and write halves are guarded independently, so one thread can
/// block in `receive` while another sends.
pub struct StreamTransport<R, W> {
    read: Mutex<ReadHalf<R>>,
    write: Mutex<W>,
    config: StreamConfig,
}

struct ReadHalf<R> {
    inner: R,
    buf: BytesMut,
}

impl<R: Read, W: Write> StreamTransport<R, W> {
    /// Create a stream transport with default configuration.
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, StreamConfig::default())
    }

    /// Create a stream transport with explicit configuration.
    pub fn with_config(reader: R, writer: W, config: StreamConfig) -> Self {
        Self {
            read: Mutex::new(ReadHalf {
                inner: reader,
                buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            }),
            write: Mutex::new(writer),
            config,
        }
    }

    /// Current stream transport configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Consume the transport and return the reader and writer halves.
    pub fn into_inner(self) -> (R, W) {
        let read = unpoison(self.read.into_inner());
        let write = unpoison(self.write.into_inner());
        (read.inner, write)
    }
}

impl<R: Read, W: Write> Transport for StreamTransport<R, W> {
    fn send(&self, message: &[u8]) -> Result<usize> {
        if message.len() > self.config.max_message_size {
            return Err(TransportError::MessageTooLarge {
                size: message.len(),
                max: self.config.max_message_size,
            });
        }

        let mut wire = BytesMut::with_capacity(HEADER_SIZE + message.len());
        encode_envelope(message, &mut wire)?;

        let mut writer = lock(&self.write);
        let mut offset = 0usize;
        while offset < wire.len() {
            match writer.write(&wire[offset..]) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match writer.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        Ok(message.len())
    }

    fn receive(&self) -> Result<Bytes> {
        let mut half = lock(&self.read);
        loop {
            if let Some(message) = decode_envelope(&mut half.buf, self.config.max_message_size)? {
                return Ok(message);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match half.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock
                        || err.kind() == ErrorKind::TimedOut =>
                {
                    // Read timeout: nothing more is coming this round.
                    return Ok(Bytes::new());
                }
                Err(err) => return Err(TransportError::Io(err)),
            };

            if read == 0 {
                return Err(TransportError::Disconnected);
            }

            half.buf.extend_from_slice(&chunk[..read]);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unpoison<T>(result: std::result::Result<T, PoisonError<T>>) -> T {
    result.unwrap_or_else(PoisonError::into_inner)
}

#[cfg(unix)]
impl StreamTransport<std::os::unix::net::UnixStream, std::os::unix::net::UnixStream> {
    /// Wrap a connected Unix stream, applying the config's timeouts.
    ///
    /// The stream is cloned so send and receive operate on independent
    /// descriptors referring to the same socket.
    pub fn from_unix(stream: std::os::unix::net::UnixStream, config: StreamConfig) -> Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        let writer = stream.try_clone()?;
        Ok(Self::with_config(stream, writer, config))
    }

    /// Get the credentials of the connected peer (Linux only).
    ///
    /// Returns `(uid, gid, pid)` via `SO_PEERCRED`, or `None` if unavailable.
    #[cfg(target_os = "linux")]
    pub fn peer_credentials(&self) -> Option<(u32, u32, u32)> {
        use std::os::fd::AsRawFd;

        let fd = lock(&self.read).inner.as_raw_fd();

        let mut cred = libc::ucred {
            pid: 0,
            uid: 0,
            gid: 0,
        };
        let mut len = std::mem::size_of::<libc::ucred>() as libc::socklen_t;

        // SAFETY: `cred` and `len` are valid writable pointers for the provided sizes,
        // and `fd` is an open Unix socket descriptor owned by this process.
        let rc = unsafe {
            libc::getsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_PEERCRED,
                (&mut cred as *mut libc::ucred).cast::<libc::c_void>(),
                &mut len,
            )
        };

        if rc == 0 && len as usize == std::mem::size_of::<libc::ucred>() {
            Some((cred.uid, cred.gid, cred.pid as u32))
        } else {
            None
        }
    }

    /// Get the credentials of the connected peer.
    ///
    /// Returns `None` on platforms that do not expose peer credentials.
    #[cfg(not(target_os = "linux"))]
    pub fn peer_credentials(&self) -> Option<(u32, u32, u32)> {
        None
    }
}
