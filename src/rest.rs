//! Session-less REST facade.
//!
//! Three synchronous endpoints that call the query engine and email gateway
//! directly, bypassing the session machinery entirely.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::email::EmailRequest;
use crate::query;
use crate::state::AppState;

pub async fn banner() -> &'static str {
    "CV MCP Server: /health, POST /ask, POST /send-email, HTTP MCP at /mcp"
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

#[derive(Debug, Deserialize)]
pub struct AskBody {
    #[serde(default)]
    pub question: String,
}

/// `POST /ask` — always 200; the query engine never fails.
pub async fn ask(State(state): State<AppState>, Json(body): Json<AskBody>) -> Json<Value> {
    let answer = query::answer(&state.resume, &body.question);
    Json(json!({ "question": body.question, "answer": answer }))
}

#[derive(Debug, Default, Deserialize)]
pub struct SendEmailBody {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// `POST /send-email` — 400 on missing fields, 500 on gateway failure.
pub async fn send_email(
    State(state): State<AppState>,
    Json(payload): Json<SendEmailBody>,
) -> Response {
    let present = |field: Option<String>| field.filter(|value| !value.is_empty());
    let (to, subject, body) = match (
        present(payload.to),
        present(payload.subject),
        present(payload.body),
    ) {
        (Some(to), Some(subject), Some(body)) => (to, subject, body),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "to, subject, body are required" })),
            )
                .into_response();
        }
    };

    match state.mailer.send(&EmailRequest { to, subject, body }).await {
        Ok(receipt) => {
            let mut reply = json!({
                "ok": true,
                "messageId": receipt.message_id,
                "usedFallbackChannel": receipt.used_fallback_channel,
            });
            if let Some(url) = receipt.preview_url {
                reply["previewUrl"] = json!(url);
            }
            Json(reply).into_response()
        }
        Err(err) => {
            warn!(error = %err, "send-email endpoint failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
