//! MCP client for tool servers spoken to over stdio.
//!
//! The verification stage uses this to reach its fact-check tool. Only the
//! pieces needed for one tool call are implemented: the initialize
//! handshake, `tools/call`, and replies to server-initiated requests.

mod session;

pub use session::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol version sent during initialize.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request sent to the server.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: &'static str,
    /// Request identifier (omitted for notifications).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// The method name to invoke.
    pub method: String,
    /// Optional parameters for the method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Any JSON-RPC message read from the server.
///
/// Responses carry `result` or `error`; server-initiated requests and
/// notifications carry `method`.
#[derive(Debug, Deserialize)]
pub struct JsonRpcMessage {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    /// Error code (negative for predefined errors).
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
}

/// Content item within a tool result.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolResultContent {
    /// The content type (e.g., "text").
    #[serde(rename = "type")]
    pub content_type: String,
    /// Text payload, present for text content.
    #[serde(default)]
    pub text: Option<String>,
}

/// Result of a `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ToolResultContent>,
    /// Whether the result represents an error.
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl JsonRpcRequest {
    /// Create a request expecting a response
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            method: method.into(),
            params: Some(params),
        }
    }

    /// Create a notification (no response expected)
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcMessage {
    /// Whether this message answers the request with the given id.
    pub fn is_response_to(&self, id: u64) -> bool {
        self.method.is_none() && self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }
}

impl ToolCallResult {
    /// Concatenated text content.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new(3, "tools/call", json!({"name": "perplexity_ask"}));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 3);
        assert_eq!(value["method"], "tools/call");
    }

    #[test]
    fn test_notification_has_no_id() {
        let req = JsonRpcRequest::notification("notifications/initialized", None);
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("params").is_none());
    }

    #[test]
    fn test_is_response_to() {
        let msg: JsonRpcMessage =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 2, "result": {}})).unwrap();
        assert!(msg.is_response_to(2));
        assert!(!msg.is_response_to(1));

        let request: JsonRpcMessage = serde_json::from_value(
            json!({"jsonrpc": "2.0", "id": 2, "method": "roots/list", "params": {}}),
        )
        .unwrap();
        assert!(!request.is_response_to(2));
    }

    #[test]
    fn test_tool_call_result_text() {
        let result: ToolCallResult = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "image", "data": "..."},
                {"type": "text", "text": "second"}
            ]
        }))
        .unwrap();
        assert!(!result.is_error);
        assert_eq!(result.text(), "first\nsecond");
    }
}
