use serde::{Deserialize, Serialize};

use super::request::RpcId;
use crate::email::EmailError;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 response layer
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RpcId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object (protocol-level errors).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn parse_error() -> Self {
        Self { code: -32700, message: "Parse error".into(), data: None }
    }

    pub fn invalid_request() -> Self {
        Self { code: -32600, message: "Invalid Request".into(), data: None }
    }

    pub fn invalid_request_with(detail: impl Into<String>) -> Self {
        Self { code: -32600, message: detail.into(), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self { code: -32602, message: detail.into(), data: None }
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self { code: -32603, message: detail.into(), data: None }
    }

    /// Session-level rejection: the token is unknown, or its transport has
    /// already entered Closed. A closed session never revives.
    pub fn no_session() -> Self {
        Self {
            code: -32600,
            message: "No such session".into(),
            data: None,
        }
    }
}

// ---------------------------------------------------------------------------
// MCP tool result layer (returned inside a *successful* JSON-RPC response)
// ---------------------------------------------------------------------------

/// MCP tool call result wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

/// A single content block inside a tool result.
///
/// Only `text` exists today; the tag leaves room for other kinds without
/// breaking consumers that match on `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Domain-level tool error types
// ---------------------------------------------------------------------------

/// Tool error code (v0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorCode {
    UnknownTool,
    InvalidArguments,
    DeliveryFailed,
    TransportUnavailable,
    InternalError,
}

impl ToolErrorCode {
    /// Map to the corresponding JSON-RPC 2.0 error code.
    ///
    /// Caller-side failures  → -32602 (Invalid params)
    /// Server-side failures  → -32603 (Internal error)
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            Self::UnknownTool | Self::InvalidArguments => -32602,
            Self::DeliveryFailed | Self::TransportUnavailable | Self::InternalError => -32603,
        }
    }
}

/// Tool error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ToolErrorCode,
    pub message: String,
}

/// Tool error response (top-level)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolErrorResponse {
    pub error: ToolError,
}

impl ToolErrorResponse {
    pub fn new(code: ToolErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ToolError {
                code,
                message: message.into(),
            },
        }
    }

    /// Construct with the canonical message for a given code.
    pub fn canonical(code: ToolErrorCode) -> Self {
        let message = match &code {
            ToolErrorCode::UnknownTool => "Tool is not registered",
            ToolErrorCode::InvalidArguments => "Arguments do not satisfy the tool schema",
            ToolErrorCode::DeliveryFailed => "Email delivery failed",
            ToolErrorCode::TransportUnavailable => "Mail channel unavailable",
            ToolErrorCode::InternalError => "Internal error",
        };
        Self::new(code, message)
    }
}

impl From<EmailError> for ToolErrorResponse {
    fn from(err: EmailError) -> Self {
        let code = match &err {
            EmailError::TransportUnavailable(_) => ToolErrorCode::TransportUnavailable,
            EmailError::DeliveryFailed(_) => ToolErrorCode::DeliveryFailed,
        };
        Self::new(code, err.to_string())
    }
}

/// Convert a tool domain error into a JSON-RPC error.
///
/// The JSON-RPC `code` is derived from the tool error code.
/// The JSON-RPC `message` is the human-readable message.
/// The full error object is carried in `data` for structured clients.
impl From<ToolErrorResponse> for JsonRpcError {
    fn from(tool_err: ToolErrorResponse) -> Self {
        Self {
            code: tool_err.error.code.json_rpc_code(),
            message: tool_err.error.message.clone(),
            data: Some(
                serde_json::to_value(&tool_err)
                    .expect("ToolErrorResponse must serialize to JSON Value"),
            ),
        }
    }
}

/// Convert a tool domain error into a tool result with `isError: true`.
///
/// The text content is the JSON-serialized `ToolErrorResponse`, preserving
/// the structured error for clients that inspect tool output.
impl From<ToolErrorResponse> for ToolResult {
    fn from(tool_err: ToolErrorResponse) -> Self {
        let json = serde_json::to_string(&tool_err)
            .expect("ToolErrorResponse must serialize to JSON string");
        Self::error(format!("{json}\n"))
    }
}
