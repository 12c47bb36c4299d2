use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cv_mcp_server::config::ServerConfig;
use cv_mcp_server::email::EmailGateway;
use cv_mcp_server::resume::Resume;
use cv_mcp_server::server;
use cv_mcp_server::session::SessionRegistry;
use cv_mcp_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("cv-mcp-server: configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Both the résumé snapshot and the mail channel are startup-fatal: the
    // server must not accept connections against an unloadable data source.
    let resume = match Resume::load(&config.resume_path).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("cv-mcp-server: cannot load resume: {e}");
            std::process::exit(1);
        }
    };

    let mailer = match EmailGateway::from_config(&config.mail) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("cv-mcp-server: cannot provision mail channel: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        config,
        resume: Arc::new(resume),
        mailer: Arc::new(mailer),
        sessions: Arc::new(SessionRegistry::new()),
    };

    if let Err(e) = server::run(state).await {
        eprintln!("cv-mcp-server: fatal error: {e}");
        std::process::exit(1);
    }
}
