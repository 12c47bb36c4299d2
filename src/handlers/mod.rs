pub mod ask_cv;
pub mod send_email;

use serde_json::Value;

use crate::protocol::{
    AskCvParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, SendEmailParams, ToolCallParams,
    ToolErrorCode, ToolErrorResponse, ToolResult,
};
use crate::schema;
use crate::state::AppState;

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(req: &JsonRpcRequest, state: &AppState) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            let result = serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "cv-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(
            req.id.clone(),
            serde_json::json!({}),
        )),

        "tools/list" => {
            let result = serde_json::json!({
                "tools": [
                    {
                        "name": "ask_cv",
                        "description": "Answer a question about the CV (last role, companies, tenure at a company)",
                        "inputSchema": schema::tool_schema_json("ask_cv"),
                    },
                    {
                        "name": "send_email",
                        "description": "Send a plain-text email to a recipient",
                        "inputSchema": schema::tool_schema_json("send_email"),
                    }
                ]
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = dispatch_tool_call(&params, state).await;
            let result_json = serde_json::to_value(&tool_result)
                .expect("ToolResult must serialize to JSON Value");
            Some(JsonRpcResponse::success(req.id.clone(), result_json))
        }

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}

/// Validate and run one tool call. Arguments are checked against the tool's
/// input schema before the handler executes, so no side effect (notably no
/// email dispatch) can happen on invalid input.
pub async fn dispatch_tool_call(params: &ToolCallParams, state: &AppState) -> ToolResult {
    if schema::tool_schema(&params.name).is_none() {
        return ToolErrorResponse::new(
            ToolErrorCode::UnknownTool,
            format!("Unknown tool: {}", params.name),
        )
        .into();
    }

    let arguments = params.arguments.clone().unwrap_or(Value::Null);
    if let Err(e) = schema::validate_arguments(&params.name, &arguments) {
        return ToolErrorResponse::new(
            ToolErrorCode::InvalidArguments,
            format!("Invalid arguments for {}: {e}", params.name),
        )
        .into();
    }

    match params.name.as_str() {
        "ask_cv" => {
            let ask_params: AskCvParams = match serde_json::from_value(arguments) {
                Ok(p) => p,
                Err(e) => {
                    return ToolErrorResponse::new(
                        ToolErrorCode::InvalidArguments,
                        format!("Invalid arguments for ask_cv: {e}"),
                    )
                    .into();
                }
            };
            ask_cv::handle(ask_params, &state.resume).await
        }

        "send_email" => {
            let send_params: SendEmailParams = match serde_json::from_value(arguments) {
                Ok(p) => p,
                Err(e) => {
                    return ToolErrorResponse::new(
                        ToolErrorCode::InvalidArguments,
                        format!("Invalid arguments for send_email: {e}"),
                    )
                    .into();
                }
            };
            send_email::handle(send_params, &state.mailer).await
        }

        // Unreachable: tool_schema() gated registration above.
        other => ToolErrorResponse::new(
            ToolErrorCode::UnknownTool,
            format!("Unknown tool: {other}"),
        )
        .into(),
    }
}
