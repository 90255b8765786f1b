//! Message transports.
//!
//! The server and its outbound client share one bidirectional channel. A
//! [`Transport`] reads and writes whole JSON bodies; framing is handled by the
//! implementation.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::time::Duration;

use serde_json::Value;

use crate::error::RpcResult;
use crate::rpc::framing::{read_message, write_message};

/// A bidirectional message channel.
pub trait Transport {
    /// Reads the next message. `Ok(None)` means the peer closed the channel.
    /// With a timeout, an implementation that can wait on its input returns
    /// [`RpcError::Timeout`](crate::error::RpcError::Timeout) when nothing
    /// arrives in time; implementations that cannot wait ignore it.
    fn receive(&mut self, timeout: Option<Duration>) -> RpcResult<Option<Value>>;

    /// Writes one message.
    fn send(&mut self, message: &Value) -> RpcResult<()>;
}

/// A transport over any buffered reader and writer. Reads block; the timeout
/// is not enforced.
pub struct StreamTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        StreamTransport { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: BufRead, W: Write> Transport for StreamTransport<R, W> {
    fn receive(&mut self, _timeout: Option<Duration>) -> RpcResult<Option<Value>> {
        read_message(&mut self.reader)
    }

    fn send(&mut self, message: &Value) -> RpcResult<()> {
        write_message(&mut self.writer, message)
    }
}

/// An in-memory transport: scripted inbound messages, recorded outbound ones.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pub inbound: VecDeque<Value>,
    pub outbound: Vec<Value>,
}

impl MemoryTransport {
    pub fn new(inbound: impl IntoIterator<Item = Value>) -> Self {
        MemoryTransport {
            inbound: inbound.into_iter().collect(),
            outbound: Vec::new(),
        }
    }
}

impl Transport for MemoryTransport {
    fn receive(&mut self, _timeout: Option<Duration>) -> RpcResult<Option<Value>> {
        Ok(self.inbound.pop_front())
    }

    fn send(&mut self, message: &Value) -> RpcResult<()> {
        self.outbound.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn stream_transport_frames_messages() {
        let mut inbound = Vec::new();
        write_message(&mut inbound, &json!({"id": 1})).unwrap();
        let mut transport = StreamTransport::new(Cursor::new(inbound), Vec::new());

        assert_eq!(transport.receive(None).unwrap(), Some(json!({"id": 1})));
        assert_eq!(transport.receive(None).unwrap(), None);

        transport.send(&json!({"ok": true})).unwrap();
        let (_, written) = transport.into_parts();
        let written = String::from_utf8(written).unwrap();
        assert!(written.ends_with("{\"ok\":true}"));
    }

    #[test]
    fn memory_transport_records_outbound() {
        let mut transport = MemoryTransport::new([json!(1), json!(2)]);
        assert_eq!(transport.receive(None).unwrap(), Some(json!(1)));
        transport.send(&json!("out")).unwrap();
        assert_eq!(transport.outbound, vec![json!("out")]);
        assert_eq!(transport.receive(None).unwrap(), Some(json!(2)));
        assert_eq!(transport.receive(None).unwrap(), None);
    }
}
