//! The outbound half of the channel.
//!
//! While servicing a request the server may call back into the host. The
//! client writes the request, then reads until the matching reply arrives.
//! Host requests that show up in between are parked in `deferred` and
//! handled once the current request completes.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rewrite_core::rpc::{Message, Request, RpcObjectData, Transport};
use rewrite_core::{RpcError, RpcResult};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

/// The transport plus everything needed to make nested calls on it.
pub(crate) struct Client<T> {
    transport: T,
    next_id: i64,
    timeout: Duration,
    trace_messages: bool,
    /// Host requests received while waiting for a reply.
    pub(crate) deferred: VecDeque<Value>,
}

impl<T: Transport> Client<T> {
    pub(crate) fn new(transport: T, timeout: Duration, trace_messages: bool) -> Self {
        Client {
            transport,
            next_id: 1,
            timeout,
            trace_messages,
            deferred: VecDeque::new(),
        }
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub(crate) fn into_transport(self) -> T {
        self.transport
    }

    /// Reads the next message without a deadline.
    pub(crate) fn receive(&mut self) -> RpcResult<Option<Value>> {
        let message = self.transport.receive(None)?;
        if let Some(message) = &message {
            self.trace("in", message);
        }
        Ok(message)
    }

    pub(crate) fn send(&mut self, message: &Value) -> RpcResult<()> {
        self.trace("out", message);
        self.transport.send(message)
    }

    fn trace(&self, direction: &str, message: &Value) {
        if self.trace_messages {
            trace!(direction, %message, "rpc");
        }
    }

    /// Sends a request to the host and waits for its reply.
    pub(crate) fn call(&mut self, method: &str, params: Value) -> RpcResult<Value> {
        let id = self.next_id;
        self.next_id += 1;
        let request = serde_json::to_value(Request::new(id, method, params))?;
        debug!(method, id, "calling host");
        self.send(&request)?;

        let started = Instant::now();
        loop {
            let remaining = self.timeout.checked_sub(started.elapsed()).ok_or_else(|| {
                RpcError::Timeout {
                    method: method.to_string(),
                    after: self.timeout,
                }
            })?;
            let value = match self.transport.receive(Some(remaining)) {
                Ok(Some(value)) => value,
                Ok(None) => return Err(RpcError::ChannelClosed(method.to_string())),
                Err(RpcError::Timeout { .. }) => {
                    return Err(RpcError::Timeout {
                        method: method.to_string(),
                        after: self.timeout,
                    })
                }
                Err(err) => return Err(err),
            };
            self.trace("in", &value);
            match Message::from_value(value.clone())? {
                Message::Response(response) if response.id == Value::from(id) => {
                    return response.into_result();
                }
                Message::Response(response) => {
                    warn!(id = %response.id, "dropping reply to an unknown request");
                }
                Message::Request(request) => {
                    debug!(method = %request.method, "deferring host request");
                    self.deferred.push_back(value);
                }
            }
        }
    }

    /// One `GetObject` batch of the host's copy of `id`.
    pub(crate) fn get_object_batch(
        &mut self,
        id: &str,
        source_file_type: Option<&str>,
    ) -> RpcResult<Vec<RpcObjectData>> {
        let params = match source_file_type {
            Some(source_file_type) => json!({"id": id, "sourceFileType": source_file_type}),
            None => json!({"id": id}),
        };
        let result = self.call("GetObject", params)?;
        Ok(serde_json::from_value(result)?)
    }
}
