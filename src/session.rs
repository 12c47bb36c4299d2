//! Session registry and per-session transport.
//!
//! The registry is the single process-wide mutable table the gateway
//! depends on. Every mutation is atomic with respect to lookups; lookups
//! are plain map reads and never suspend. A token, once bound, resolves to
//! the same transport until the session closes; closing removes the token,
//! so a reused token reads as unknown rather than reattaching.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::handlers;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::state::AppState;

/// Token already bound to a live transport. Internal: callers mint random
/// tokens and retry, this is never surfaced to a peer.
#[derive(Debug, thiserror::Error)]
#[error("session token already bound")]
pub struct AlreadyBound;

/// Protocol framing for one logical session.
///
/// Lifecycle: Uninitialized until the `initialize` request is handled,
/// then Active, then Closed. Closed is terminal; every request after it
/// gets a "no such session" error.
pub struct SessionTransport {
    token: String,
    created_at: DateTime<Utc>,
    initialized: AtomicBool,
    closed: AtomicBool,
    last_activity: Mutex<Instant>,
    /// Serializes this session's own traffic. Cross-session requests run
    /// unordered.
    serialize: tokio::sync::Mutex<()>,
}

impl SessionTransport {
    fn new(token: String) -> Self {
        Self {
            token,
            created_at: Utc::now(),
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            last_activity: Mutex::new(Instant::now()),
            serialize: tokio::sync::Mutex::new(()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Time since this session last carried a request.
    pub fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Enter Closed. Returns true only for the first caller, so the
    /// unregister side effect runs exactly once.
    fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Decode-and-dispatch one request on this session.
    ///
    /// Returns `None` for notifications (the HTTP layer answers 202).
    pub async fn handle(
        &self,
        req: &JsonRpcRequest,
        state: &AppState,
    ) -> Option<JsonRpcResponse> {
        if self.is_closed() {
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                JsonRpcError::no_session(),
            ));
        }

        let _guard = self.serialize.lock().await;
        // The session may have been closed while this request waited its turn.
        if self.is_closed() {
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                JsonRpcError::no_session(),
            ));
        }

        // Initialization gate: only `initialize` is allowed before the
        // handshake completes.
        if !self.initialized.load(Ordering::Acquire) && !req.is_initialize() {
            if req.id.is_none() {
                return None;
            }
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                JsonRpcError::invalid_request_with("Session not initialized"),
            ));
        }

        self.touch();
        let response = handlers::dispatch(req, state).await;

        if req.is_initialize() {
            self.initialized.store(true, Ordering::Release);
        }

        response
    }
}

/// Process-wide mapping from session token to its transport.
///
/// Constructed empty at startup and handed to the HTTP layer through
/// `AppState`; torn down with [`SessionRegistry::close_all`].
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionTransport>>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Pure map read; absent tokens (never registered, or already closed)
    /// return `None`.
    pub fn lookup(&self, token: &str) -> Option<Arc<SessionTransport>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    /// Bind a transport to its token. Fails if the token is already bound.
    pub fn register(&self, transport: Arc<SessionTransport>) -> Result<(), AlreadyBound> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match sessions.entry(transport.token().to_string()) {
            Entry::Occupied(_) => Err(AlreadyBound),
            Entry::Vacant(slot) => {
                slot.insert(transport);
                Ok(())
            }
        }
    }

    /// Remove a token. Idempotent: unregistering an absent token is a no-op.
    pub fn unregister(&self, token: &str) -> Option<Arc<SessionTransport>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
    }

    /// Mint a fresh token, build its transport, and register it before
    /// returning. Token collisions are retried here, never surfaced.
    pub fn open(&self) -> Arc<SessionTransport> {
        loop {
            let token = Uuid::new_v4().to_string();
            let transport = Arc::new(SessionTransport::new(token.clone()));
            match self.register(Arc::clone(&transport)) {
                Ok(()) => {
                    info!(session = %token, "session opened");
                    return transport;
                }
                Err(AlreadyBound) => {
                    warn!(session = %token, "session token collision, regenerating");
                }
            }
        }
    }

    /// Remove and close a session. Returns false when the token is unknown.
    pub fn close(&self, token: &str) -> bool {
        match self.unregister(token) {
            Some(transport) => {
                if transport.mark_closed() {
                    info!(session = %token, "session closed");
                }
                true
            }
            None => false,
        }
    }

    /// Close every live session. Teardown path; also invoked on shutdown.
    pub fn close_all(&self) {
        let drained: Vec<(String, Arc<SessionTransport>)> = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        for (token, transport) in drained {
            if transport.mark_closed() {
                debug!(session = %token, "session closed at teardown");
            }
        }
    }

    /// Close sessions that carried no traffic for `max_idle`. Returns the
    /// number of sessions swept.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let stale: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, transport)| transport.idle_for() > max_idle)
            .map(|(token, _)| token.clone())
            .collect();

        let mut swept = 0;
        for token in stale {
            if self.close(&token) {
                swept += 1;
            }
        }
        swept
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
