//! JSON-RPC 2.0 message types

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON-RPC version string
pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision answered when the client does not name one
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Invalid JSON
pub const PARSE_ERROR: i64 = -32700;
/// JSON that is not a request object
pub const INVALID_REQUEST: i64 = -32600;
/// Unknown method
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Bad or missing parameters
pub const INVALID_PARAMS: i64 = -32602;
/// Server-side failure
pub const INTERNAL_ERROR: i64 = -32603;

/// Incoming request or notification
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`
    pub jsonrpc: String,
    /// Absent for notifications; a present `null` is still a request
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Value,
}

/// `Some` for any value that is present, `null` included
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Notifications carry no id and get no response
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Error object of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Human-readable description
    pub message: String,
}

impl JsonRpcError {
    /// Error with an explicit code
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `-32601` for `method`
    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("method not found: {method}"))
    }
}

impl From<Error> for JsonRpcError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidArgument(_) | Error::UnknownTool(_) | Error::UnknownResource(_) => {
                INVALID_PARAMS
            }
            _ => INTERNAL_ERROR,
        };
        Self::new(code, err.to_string())
    }
}

/// Outgoing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`
    pub jsonrpc: String,
    /// Id of the request being answered (`null` when it could not be read)
    pub id: Value,
    /// Set on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response
    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}
