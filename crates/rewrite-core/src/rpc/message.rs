//! JSON-RPC 2.0 message shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RpcError, RpcResult};

const JSONRPC_VERSION: &str = "2.0";

/// A request (or notification, when `id` is absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Request {
    pub fn new(id: i64, method: impl Into<String>, params: Value) -> Self {
        Request {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(Value::from(id)),
            method: method.into(),
            params,
        }
    }
}

/// The `error` member of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A response to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: ErrorObject) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Converts the response into the result value or a remote error.
    pub fn into_result(self) -> RpcResult<Value> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

/// Any message that can arrive on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Response(Response),
}

impl Message {
    /// Classifies a decoded JSON body: anything with a `method` is a request.
    pub fn from_value(value: Value) -> RpcResult<Self> {
        if value.get("method").is_some() {
            Ok(Message::Request(serde_json::from_value(value)?))
        } else {
            Ok(Message::Response(serde_json::from_value(value)?))
        }
    }

    pub fn to_value(&self) -> RpcResult<Value> {
        Ok(match self {
            Message::Request(request) => serde_json::to_value(request)?,
            Message::Response(response) => serde_json::to_value(response)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_request_and_response() {
        let request = Message::from_value(json!({
            "jsonrpc": "2.0", "id": 4, "method": "Print", "params": {"treeId": "x"}
        }))
        .unwrap();
        assert!(matches!(request, Message::Request(ref r) if r.method == "Print"));

        let response = Message::from_value(json!({"jsonrpc": "2.0", "id": 4, "result": "ok"})).unwrap();
        match response {
            Message::Response(r) => assert_eq!(r.into_result().unwrap(), json!("ok")),
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn error_response_becomes_remote_error() {
        let response = Response::failure(
            json!(1),
            ErrorObject {
                code: -32601,
                message: "method not found".into(),
                data: None,
            },
        );
        let err = response.into_result().unwrap_err();
        assert!(matches!(err, RpcError::Remote { code: -32601, .. }));
    }

    #[test]
    fn request_omits_null_params() {
        let encoded = serde_json::to_value(Request::new(1, "Reset", Value::Null)).unwrap();
        assert_eq!(encoded, json!({"jsonrpc": "2.0", "id": 1, "method": "Reset"}));
    }
}
