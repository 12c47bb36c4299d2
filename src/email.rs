//! Outbound email gateway.
//!
//! Channel selection happens once, at construction: full SMTP credentials
//! select a STARTTLS relay, anything less provisions an ephemeral file
//! outbox whose receipts carry a `file://…eml` preview link instead of real
//! delivery. Bodies are always plain text.

use std::path::{Path, PathBuf};

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::MailConfig;

/// Sender used by the fallback outbox when no `SMTP_FROM` is configured.
const FALLBACK_FROM: &str = "Demo Sender <demo@cv-mcp.local>";

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("mail channel unavailable: {0}")]
    TransportUnavailable(String),
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

/// One outbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery receipt. Transient; never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailReceipt {
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub used_fallback_channel: bool,
}

enum MailChannel {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File {
        transport: AsyncFileTransport<Tokio1Executor>,
        dir: PathBuf,
    },
}

pub struct EmailGateway {
    channel: MailChannel,
    from: Mailbox,
}

impl EmailGateway {
    /// Select and provision a mail channel from configuration.
    pub fn from_config(config: &MailConfig) -> Result<Self, EmailError> {
        match config.credentials() {
            Some((host, user, pass)) => {
                let from_raw = config.from.clone().unwrap_or_else(|| user.clone());
                let from = parse_mailbox(&from_raw)?;
                let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                    .map_err(|e| EmailError::TransportUnavailable(e.to_string()))?
                    .port(config.smtp_port)
                    .credentials(Credentials::new(user, pass))
                    .build();
                info!(host = %host, "email gateway using configured SMTP relay");
                Ok(Self {
                    channel: MailChannel::Smtp(transport),
                    from,
                })
            }
            None => {
                let dir = config
                    .outbox_dir
                    .clone()
                    .unwrap_or_else(default_outbox_dir);
                let from_raw = config
                    .from
                    .clone()
                    .unwrap_or_else(|| FALLBACK_FROM.to_string());
                let mut gateway = Self::ephemeral(&dir)?;
                gateway.from = parse_mailbox(&from_raw)?;
                info!(outbox = %dir.display(), "no SMTP credentials; email gateway using fallback outbox");
                Ok(gateway)
            }
        }
    }

    /// Provision the ephemeral fallback outbox directly.
    pub fn ephemeral(dir: &Path) -> Result<Self, EmailError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            EmailError::TransportUnavailable(format!(
                "cannot create outbox {}: {e}",
                dir.display()
            ))
        })?;
        let from = parse_mailbox(FALLBACK_FROM)?;
        Ok(Self {
            channel: MailChannel::File {
                transport: AsyncFileTransport::new(dir),
                dir: dir.to_path_buf(),
            },
            from,
        })
    }

    pub fn uses_fallback(&self) -> bool {
        matches!(self.channel, MailChannel::File { .. })
    }

    /// Dispatch one plain-text message and return its receipt.
    pub async fn send(&self, request: &EmailRequest) -> Result<EmailReceipt, EmailError> {
        let to: Mailbox = request
            .to
            .parse()
            .map_err(|e| EmailError::DeliveryFailed(format!("invalid recipient: {e}")))?;
        let message_id = format!("<{}@cv-mcp.local>", Uuid::new_v4());

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(request.subject.clone())
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_PLAIN)
            .body(request.body.clone())
            .map_err(|e| EmailError::DeliveryFailed(e.to_string()))?;

        match &self.channel {
            MailChannel::Smtp(transport) => {
                transport
                    .send(message)
                    .await
                    .map_err(|e| EmailError::DeliveryFailed(e.to_string()))?;
                debug!(%message_id, "message accepted by SMTP relay");
                Ok(EmailReceipt {
                    message_id,
                    preview_url: None,
                    used_fallback_channel: false,
                })
            }
            MailChannel::File { transport, dir } => {
                let file_id = transport
                    .send(message)
                    .await
                    .map_err(|e| EmailError::DeliveryFailed(e.to_string()))?;
                let preview = format!(
                    "file://{}",
                    dir.join(format!("{file_id}.eml")).display()
                );
                debug!(%message_id, preview = %preview, "message written to fallback outbox");
                Ok(EmailReceipt {
                    message_id,
                    preview_url: Some(preview),
                    used_fallback_channel: true,
                })
            }
        }
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, EmailError> {
    raw.parse()
        .map_err(|e| EmailError::TransportUnavailable(format!("invalid sender address {raw:?}: {e}")))
}

fn default_outbox_dir() -> PathBuf {
    std::env::temp_dir().join(format!("cv-mcp-outbox-{}", std::process::id()))
}
