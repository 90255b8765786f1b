//! The stdio transport.
//!
//! Reads go through our own buffer over a duplicate of the stdin
//! descriptor, so a timed wait can tell whether a frame is already buffered
//! before polling the descriptor.

use std::io::{self, BufReader, Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::time::Duration;

use rewrite_core::rpc::framing::{read_message, write_message};
use rewrite_core::rpc::Transport;
use rewrite_core::{RpcError, RpcResult};
use serde_json::Value;

/// A framed transport over a pollable reader.
pub struct FdTransport<R: Read + AsFd, W: Write> {
    reader: BufReader<R>,
    writer: W,
}

impl<R: Read + AsFd, W: Write> FdTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        FdTransport {
            reader: BufReader::new(reader),
            writer,
        }
    }
}

/// A transport over this process's stdin and stdout.
pub fn stdio() -> io::Result<FdTransport<std::fs::File, io::Stdout>> {
    let stdin = io::stdin().as_fd().try_clone_to_owned()?;
    Ok(FdTransport::new(std::fs::File::from(stdin), io::stdout()))
}

impl<R: Read + AsFd, W: Write> Transport for FdTransport<R, W> {
    fn receive(&mut self, timeout: Option<Duration>) -> RpcResult<Option<Value>> {
        if let Some(timeout) = timeout {
            if self.reader.buffer().is_empty() && !wait_readable(self.reader.get_ref().as_fd(), timeout)? {
                return Err(RpcError::Timeout {
                    method: String::new(),
                    after: timeout,
                });
            }
        }
        read_message(&mut self.reader)
    }

    fn send(&mut self, message: &Value) -> RpcResult<()> {
        write_message(&mut self.writer, message)
    }
}

/// Waits until `fd` is readable or at end of input; `false` on timeout.
fn wait_readable(fd: BorrowedFd<'_>, timeout: Duration) -> io::Result<bool> {
    let mut poll_fd = libc::pollfd {
        fd: fd.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
    loop {
        // SAFETY: `poll_fd` is a live pollfd and the count matches.
        let ready = unsafe { libc::poll(&mut poll_fd, 1, millis) };
        if ready >= 0 {
            return Ok(ready > 0);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::os::unix::net::UnixStream;

    #[test]
    fn framed_messages_arrive() {
        let (mut host, plugin) = UnixStream::pair().unwrap();
        let mut transport = FdTransport::new(plugin, Vec::new());

        write_message(&mut host, &json!({"id": 1})).unwrap();
        write_message(&mut host, &json!({"id": 2})).unwrap();
        let timeout = Some(Duration::from_secs(5));
        assert_eq!(transport.receive(timeout).unwrap(), Some(json!({"id": 1})));
        // The second frame is already buffered.
        assert_eq!(transport.receive(timeout).unwrap(), Some(json!({"id": 2})));

        drop(host);
        assert_eq!(transport.receive(timeout).unwrap(), None);
    }

    #[test]
    fn silence_times_out() {
        let (_host, plugin) = UnixStream::pair().unwrap();
        let mut transport = FdTransport::new(plugin, Vec::new());
        let err = transport.receive(Some(Duration::from_millis(20))).unwrap_err();
        assert!(matches!(err, RpcError::Timeout { .. }));
    }

    #[test]
    fn sends_are_framed() {
        let (_host, plugin) = UnixStream::pair().unwrap();
        let mut transport = FdTransport::new(plugin, Vec::new());
        transport.send(&json!({"ok": true})).unwrap();
        let written = String::from_utf8(transport.writer.clone()).unwrap();
        assert_eq!(written, "Content-Length: 11\r\n\r\n{\"ok\":true}");
    }
}
