//! CV MCP server.
//!
//! Exposes a structured résumé (`ask_cv`) and an outbound email action
//! (`send_email`) as MCP tools over the Streamable HTTP transport at `/mcp`,
//! session-correlated via the `mcp-session-id` header, plus a session-less
//! REST facade (`/health`, `/ask`, `/send-email`).

pub mod config;
pub mod email;
pub mod handlers;
pub mod protocol;
pub mod query;
pub mod rest;
pub mod resume;
pub mod server;
pub mod session;
pub mod state;

pub mod schema;
