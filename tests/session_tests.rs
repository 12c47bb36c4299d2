//! Session registry and transport state-machine tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cv_mcp_server::config::{MailConfig, ServerConfig};
use cv_mcp_server::email::EmailGateway;
use cv_mcp_server::protocol::{JsonRpcRequest, RpcId};
use cv_mcp_server::resume::Resume;
use cv_mcp_server::session::SessionRegistry;
use cv_mcp_server::state::AppState;

fn test_state(outbox: &Path) -> AppState {
    AppState {
        config: ServerConfig {
            resume_path: PathBuf::from("resume.json"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            mail: MailConfig::default(),
            session_idle: None,
        },
        resume: Arc::new(Resume::default()),
        mailer: Arc::new(EmailGateway::ephemeral(outbox).unwrap()),
        sessions: Arc::new(SessionRegistry::new()),
    }
}

fn initialize_request() -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(1)),
        method: "initialize".into(),
        params: Some(serde_json::json!({ "protocolVersion": "2024-11-05" })),
    }
}

fn ping_request(id: i64) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(id)),
        method: "ping".into(),
        params: None,
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_then_lookup_returns_same_transport() {
    let registry = SessionRegistry::new();
    let transport = registry.open();

    let found = registry.lookup(transport.token()).unwrap();
    assert!(Arc::ptr_eq(&transport, &found), "token must resolve to the same transport");

    registry.unregister(transport.token());
    assert!(registry.lookup(transport.token()).is_none());
}

#[tokio::test]
async fn unregister_is_idempotent() {
    let registry = SessionRegistry::new();
    let transport = registry.open();
    let token = transport.token().to_string();

    assert!(registry.unregister(&token).is_some());
    assert!(registry.unregister(&token).is_none(), "second unregister is a no-op");
    assert!(registry.unregister("never-registered").is_none());
}

#[tokio::test]
async fn register_rejects_bound_token() {
    let registry = SessionRegistry::new();
    let transport = registry.open();

    let err = registry.register(Arc::clone(&transport));
    assert!(err.is_err(), "re-registering a bound token must fail");
    assert_eq!(registry.len(), 1, "failed registration must not disturb the table");
}

#[tokio::test]
async fn close_removes_token_so_reuse_reads_as_unknown() {
    let registry = SessionRegistry::new();
    let transport = registry.open();
    let token = transport.token().to_string();

    assert!(registry.close(&token));
    assert!(registry.lookup(&token).is_none());
    assert!(!registry.close(&token), "closing an unknown token reports false");
}

// ---------------------------------------------------------------------------
// Transport state machine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uninitialized_transport_rejects_other_requests() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let transport = state.sessions.open();
    let response = transport.handle(&ping_request(7), &state).await.unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32600);
    assert!(error.message.contains("not initialized"));
}

#[tokio::test]
async fn initialize_then_invoke_stays_active() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let transport = state.sessions.open();
    let init = transport.handle(&initialize_request(), &state).await.unwrap();
    assert!(init.error.is_none());

    for id in 0..3 {
        let response = transport.handle(&ping_request(id), &state).await.unwrap();
        assert!(response.error.is_none(), "active transport keeps serving");
    }
}

#[tokio::test]
async fn closed_transport_rejects_idempotently() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let transport = state.sessions.open();
    transport.handle(&initialize_request(), &state).await.unwrap();

    let token = transport.token().to_string();
    assert!(state.sessions.close(&token));
    assert!(transport.is_closed());

    // Closed is terminal: any number of further invocations get the same
    // "no such session" rejection.
    for id in 0..5 {
        let response = transport.handle(&ping_request(id), &state).await.unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.message, "No such session");
    }
}

#[tokio::test]
async fn concurrent_initializations_yield_two_consistent_sessions() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let state_a = state.clone();
    let state_b = state.clone();
    let task_a = tokio::spawn(async move {
        let transport = state_a.sessions.open();
        transport.handle(&initialize_request(), &state_a).await.unwrap();
        transport.token().to_string()
    });
    let task_b = tokio::spawn(async move {
        let transport = state_b.sessions.open();
        transport.handle(&initialize_request(), &state_b).await.unwrap();
        transport.token().to_string()
    });

    let token_a = task_a.await.unwrap();
    let token_b = task_b.await.unwrap();

    assert_ne!(token_a, token_b, "racing initializations get distinct tokens");
    assert_eq!(state.sessions.len(), 2, "registry holds exactly two entries");
    assert!(state.sessions.lookup(&token_a).is_some());
    assert!(state.sessions.lookup(&token_b).is_some());
}

#[tokio::test]
async fn close_all_drains_the_registry() {
    let registry = SessionRegistry::new();
    let a = registry.open();
    let b = registry.open();

    registry.close_all();
    assert!(registry.is_empty());
    assert!(a.is_closed());
    assert!(b.is_closed());
}

#[tokio::test]
async fn idle_sweep_closes_only_stale_sessions() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let stale = state.sessions.open();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let fresh = state.sessions.open();
    fresh.handle(&initialize_request(), &state).await.unwrap();

    let swept = state.sessions.sweep_idle(Duration::from_millis(100));
    assert_eq!(swept, 1);
    assert!(stale.is_closed());
    assert!(!fresh.is_closed());
    assert_eq!(state.sessions.len(), 1);
}
