//! HTTP server: router assembly and the `/mcp` streamable-HTTP endpoint.
//!
//! `/mcp` takes the raw body (no JSON middleware runs first) and correlates
//! requests to sessions through the `mcp-session-id` header. A request
//! without a recognized token may only be an `initialize`; anything else is
//! a protocol error. DELETE terminates the session.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
use crate::rest;
use crate::session::SessionRegistry;
use crate::state::AppState;

/// Header carrying the opaque session token.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Idle reaper never waits longer than this between sweeps.
const MAX_REAPER_PERIOD: Duration = Duration::from_secs(30);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(rest::banner))
        .route("/health", get(rest::health))
        .route("/ask", post(rest::ask))
        .route("/send-email", post(rest::send_email))
        .route("/mcp", any(mcp_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind, serve, and tear the session table down on shutdown.
pub async fn run(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.bind_addr;
    let sessions = Arc::clone(&state.sessions);

    if let Some(max_idle) = state.config.session_idle {
        spawn_idle_reaper(Arc::clone(&sessions), max_idle);
    }

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sessions.close_all();
    info!("session registry torn down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

fn spawn_idle_reaper(sessions: Arc<SessionRegistry>, max_idle: Duration) {
    let period = max_idle.min(MAX_REAPER_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let swept = sessions.sweep_idle(max_idle);
            if swept > 0 {
                info!(swept, "idle sessions closed");
            }
        }
    });
}

async fn mcp_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let token = session_token(&headers);

    if method == Method::POST {
        handle_post(state, token, &body).await
    } else if method == Method::DELETE {
        handle_delete(state, token)
    } else {
        rpc_error(
            StatusCode::METHOD_NOT_ALLOWED,
            None,
            JsonRpcError::invalid_request_with("Method not allowed on /mcp"),
        )
    }
}

async fn handle_post(state: AppState, token: Option<String>, body: &[u8]) -> Response {
    let req: JsonRpcRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "unparsable /mcp body");
            return rpc_error(StatusCode::BAD_REQUEST, None, JsonRpcError::parse_error());
        }
    };

    if req.jsonrpc != "2.0" {
        return rpc_error(
            StatusCode::BAD_REQUEST,
            req.id.clone(),
            JsonRpcError::invalid_request(),
        );
    }

    // A stale or unknown token reads the same as no token at all: the
    // registry entry is gone, so only an initialize may (re)create a
    // session under a fresh token.
    let transport = token.as_deref().and_then(|t| state.sessions.lookup(t));

    match transport {
        // Established session: route to its transport.
        Some(transport) => match transport.handle(&req, &state).await {
            Some(resp) => (StatusCode::OK, Json(resp)).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },

        // No recognized session: only an initialize may create one. Two
        // racing initializations each get their own token and session.
        None if req.is_initialize() => {
            let transport = state.sessions.open();
            let mut response = match transport.handle(&req, &state).await {
                Some(resp) => (StatusCode::OK, Json(resp)).into_response(),
                None => StatusCode::ACCEPTED.into_response(),
            };
            if let Ok(value) = HeaderValue::from_str(transport.token()) {
                response.headers_mut().insert(SESSION_HEADER, value);
            }
            response
        }

        None => rpc_error(
            StatusCode::BAD_REQUEST,
            req.id.clone(),
            JsonRpcError::invalid_request_with("No MCP session. Send initialize request first."),
        ),
    }
}

fn handle_delete(state: AppState, token: Option<String>) -> Response {
    match token {
        Some(token) => {
            if state.sessions.close(&token) {
                StatusCode::NO_CONTENT.into_response()
            } else {
                rpc_error(StatusCode::NOT_FOUND, None, JsonRpcError::no_session())
            }
        }
        None => rpc_error(
            StatusCode::BAD_REQUEST,
            None,
            JsonRpcError::invalid_request_with("Missing mcp-session-id header"),
        ),
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn rpc_error(status: StatusCode, id: Option<RpcId>, error: JsonRpcError) -> Response {
    (status, Json(JsonRpcResponse::error(id, error))).into_response()
}
