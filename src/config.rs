use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default HTTP port.
const DEFAULT_PORT: u16 = 8080;

/// Default SMTP submission port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default idle-session lifetime (seconds). 0 disables the reaper.
const DEFAULT_SESSION_IDLE_SECS: u64 = 300;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub resume_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub mail: MailConfig,
    /// Sessions with no traffic for this long are closed. `None` disables.
    pub session_idle: Option<Duration>,
}

/// Mail channel configuration. The SMTP relay is selected only when host,
/// user, and password are all present; otherwise the fallback outbox is used.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub from: Option<String>,
    pub outbox_dir: Option<PathBuf>,
}

impl MailConfig {
    /// Returns `(host, user, pass)` when real credentials are fully present.
    pub fn credentials(&self) -> Option<(String, String, String)> {
        match (&self.smtp_host, &self.smtp_user, &self.smtp_pass) {
            (Some(host), Some(user), Some(pass)) => {
                Some((host.clone(), user.clone(), pass.clone()))
            }
            _ => None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `CV_RESUME_PATH` (optional, default `resume.json`) — résumé source
    /// - `PORT` (optional, default 8080) — HTTP listen port
    /// - `SMTP_HOST` / `SMTP_USER` / `SMTP_PASS` (optional) — real mail
    ///   channel; all three must be set to take effect
    /// - `SMTP_PORT` (optional, default 587)
    /// - `SMTP_FROM` (optional) — sender address
    /// - `CV_OUTBOX_DIR` (optional) — fallback outbox directory
    /// - `CV_SESSION_IDLE_SECS` (optional, default 300, 0 disables) — idle
    ///   session lifetime
    pub fn from_env() -> Result<Self, String> {
        let resume_path = std::env::var("CV_RESUME_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("resume.json"));

        let port = match std::env::var("PORT") {
            Ok(val) => val
                .parse::<u16>()
                .map_err(|_| "PORT must be a valid port number".to_string())?,
            Err(_) => DEFAULT_PORT,
        };
        let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));

        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(val) => val
                .parse::<u16>()
                .map_err(|_| "SMTP_PORT must be a valid port number".to_string())?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        let idle_secs = match std::env::var("CV_SESSION_IDLE_SECS") {
            Ok(val) => val
                .parse::<u64>()
                .map_err(|_| "CV_SESSION_IDLE_SECS must be a non-negative integer".to_string())?,
            Err(_) => DEFAULT_SESSION_IDLE_SECS,
        };
        let session_idle = (idle_secs > 0).then(|| Duration::from_secs(idle_secs));

        Ok(Self {
            resume_path,
            bind_addr,
            mail: MailConfig {
                smtp_host: std::env::var("SMTP_HOST").ok(),
                smtp_port,
                smtp_user: std::env::var("SMTP_USER").ok(),
                smtp_pass: std::env::var("SMTP_PASS").ok(),
                from: std::env::var("SMTP_FROM").ok(),
                outbox_dir: std::env::var("CV_OUTBOX_DIR").ok().map(PathBuf::from),
            },
            session_idle,
        })
    }
}
