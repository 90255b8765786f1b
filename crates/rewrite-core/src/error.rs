//! Error types for the RPC delta protocol and its transport.
//!
//! `RpcError` covers the protocol half of the error taxonomy: mis-framed
//! messages, unknown methods, sender/receiver desynchronization, codec
//! mismatches and outbound request timeouts. Each variant maps to a stable
//! JSON-RPC error code through [`RpcError::code`].

use std::time::Duration;

use thiserror::Error;

/// JSON-RPC error codes used in error responses.
pub mod codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i64 = -32700;
    /// The JSON sent is not a valid request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error while servicing a request.
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Errors raised by the framing layer, the delta codec and the RPC client.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A header line could not be parsed.
    #[error("invalid header line: {line:?}")]
    InvalidHeader { line: String },

    /// The header block ended without a `Content-Length`.
    #[error("message has no Content-Length header")]
    MissingContentLength,

    /// The stream ended in the middle of a message.
    #[error("unexpected end of stream while reading a message body")]
    UnexpectedEof,

    /// The receive codec expected one wire type and found another.
    #[error("codec mismatch: expected {expected}, found {found}")]
    CodecMismatch { expected: String, found: String },

    /// No codec is registered for a wire type name.
    #[error("no codec registered for value type {0}")]
    UnknownValueType(String),

    /// Sender and receiver disagree on the shape of the stream.
    #[error("delta stream out of sync: {0}")]
    Desync(String),

    /// An outbound request did not receive its reply in time.
    #[error("timed out after {after:?} waiting for the reply to {method}")]
    Timeout { method: String, after: Duration },

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The peer answered an outbound request with an error object.
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },

    /// The peer closed the channel while a reply was outstanding.
    #[error("channel closed while waiting for the reply to {0}")]
    ChannelClosed(String),
}

impl RpcError {
    /// The JSON-RPC error code reported for this error.
    pub fn code(&self) -> i64 {
        match self {
            RpcError::Json(_) | RpcError::InvalidHeader { .. } | RpcError::MissingContentLength => {
                codes::PARSE_ERROR
            }
            RpcError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => codes::INVALID_PARAMS,
            RpcError::Remote { code, .. } => *code,
            _ => codes::INTERNAL_ERROR,
        }
    }

    /// Shorthand for a desynchronization error.
    pub fn desync(message: impl Into<String>) -> Self {
        RpcError::Desync(message.into())
    }
}

/// Result type for protocol operations.
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_jsonrpc_conventions() {
        assert_eq!(RpcError::MethodNotFound("Nope".into()).code(), -32601);
        assert_eq!(RpcError::InvalidParams("id".into()).code(), -32602);
        assert_eq!(RpcError::MissingContentLength.code(), -32700);
        assert_eq!(RpcError::desync("bad").code(), -32603);
        assert_eq!(
            RpcError::Remote {
                code: 7,
                message: "x".into()
            }
            .code(),
            7
        );
    }

    #[test]
    fn display_includes_context() {
        let err = RpcError::CodecMismatch {
            expected: "Identifier".into(),
            found: "Literal".into(),
        };
        assert_eq!(
            err.to_string(),
            "codec mismatch: expected Identifier, found Literal"
        );
    }
}
