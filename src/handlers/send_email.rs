use tracing::warn;

use crate::email::{EmailGateway, EmailRequest};
use crate::protocol::{SendEmailParams, ToolErrorResponse, ToolResult};

/// Handle a `send_email` tool call. Arguments were already validated against
/// the input schema; this dispatches exactly one message and reports the
/// receipt (with a preview link when the fallback outbox is in use).
pub async fn handle(params: SendEmailParams, mailer: &EmailGateway) -> ToolResult {
    let request = EmailRequest {
        to: params.to,
        subject: params.subject,
        body: params.body,
    };

    match mailer.send(&request).await {
        Ok(receipt) => {
            let mut text = format!("Queued email: {}", receipt.message_id);
            if let Some(url) = &receipt.preview_url {
                text.push_str(&format!("\nPreview: {url}"));
            }
            ToolResult::text(text)
        }
        Err(err) => {
            warn!(to = %request.to, error = %err, "send_email tool call failed");
            ToolErrorResponse::from(err).into()
        }
    }
}
