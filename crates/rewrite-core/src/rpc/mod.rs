//! The RPC delta protocol.
//!
//! - [`object_data`]: the `RpcObjectData` record and its states
//! - [`queue`]: send/receive queues, the codec traits, reference interning
//!   and list reconciliation
//! - [`framing`]: Content-Length framing
//! - [`message`]: JSON-RPC request/response shapes
//! - [`transport`]: the channel abstraction shared by server and client

pub mod framing;
pub mod message;
pub mod object_data;
pub mod queue;
pub mod transport;

pub use message::{ErrorObject, Message, Request, Response};
pub use object_data::{RpcObjectData, State};
pub use queue::{
    BatchSource, LocalRefs, ReceiveQueue, RemoteRefs, RpcField, RpcObject, RpcValue, SendQueue,
};
pub use transport::{MemoryTransport, StreamTransport, Transport};
