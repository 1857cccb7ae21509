//! JSON-RPC 2.0 envelopes and the server's own request types.
//!
//! Standard LSP params and results come from [`lsp_types`]; this module only
//! builds and classifies the JSON-RPC messages that carry them.

use lsp_types::TextDocumentIdentifier;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// JSON-RPC error code: invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;

/// JSON-RPC error code: the message is not a valid request.
pub const INVALID_REQUEST: i64 = -32600;

/// JSON-RPC error code: method not found.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC error code: invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;

/// JSON-RPC error code: internal error.
pub const INTERNAL_ERROR: i64 = -32603;

/// LSP error code: a request arrived before `initialize`.
pub const SERVER_NOT_INITIALIZED: i64 = -32002;

/// Custom request returning the cached view analysis of a document.
pub const VIEW_CALLS_METHOD: &str = "tempest/viewCalls";

pub fn make_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

pub fn make_error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}

pub fn make_notification(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params
    })
}

/// A decoded incoming message.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Request {
        id: Value,
        method: String,
        params: Value,
    },
    Notification {
        method: String,
        params: Value,
    },
    /// A response to a server-initiated request. The server sends none, so
    /// these are only logged.
    Response { id: Value },
    Invalid { id: Value, reason: String },
}

impl Incoming {
    pub fn classify(msg: Value) -> Self {
        let Value::Object(mut obj) = msg else {
            return Incoming::Invalid {
                id: Value::Null,
                reason: "message is not a JSON object".to_string(),
            };
        };

        let id = obj.remove("id");
        let params = obj.remove("params").unwrap_or(Value::Null);

        match (obj.remove("method"), id) {
            (Some(Value::String(method)), Some(id)) => Incoming::Request { id, method, params },
            (Some(Value::String(method)), None) => Incoming::Notification { method, params },
            (Some(_), id) => Incoming::Invalid {
                id: id.unwrap_or(Value::Null),
                reason: "method must be a string".to_string(),
            },
            (None, Some(id)) if obj.contains_key("result") || obj.contains_key("error") => {
                Incoming::Response { id }
            }
            (None, id) => Incoming::Invalid {
                id: id.unwrap_or(Value::Null),
                reason: "message has no method".to_string(),
            },
        }
    }
}

/// Params of the `tempest/viewCalls` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCallsParams {
    pub text_document: TextDocumentIdentifier,
}
