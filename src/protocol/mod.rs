pub mod request;
pub mod response;

pub use request::{
    AskCvParams, ClientInfo, InitializeParams, JsonRpcRequest, RpcId, SendEmailParams,
    ToolCallParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, ToolContent, ToolError, ToolErrorCode, ToolErrorResponse,
    ToolResult,
};
