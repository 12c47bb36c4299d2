use std::sync::Arc;

use crate::config::ServerConfig;
use crate::email::EmailGateway;
use crate::resume::Resume;
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The session registry lives here, owned and passed in at startup — never a
/// process global. Teardown goes through `SessionRegistry::close_all`.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Immutable résumé snapshot, loaded once at startup.
    pub resume: Arc<Resume>,
    pub mailer: Arc<EmailGateway>,
    pub sessions: Arc<SessionRegistry>,
}
