#![allow(dead_code)]
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{Duration, Utc};
use std::sync::{Arc, OnceLock};

use gramdarpan_backend::{
    app,
    config::Config,
    repositories::InMemorySessionStore,
    services::{InMemoryCredentialStore, SessionManager, SessionSettings},
    state::AppState,
    utils::time::ManualClock,
};

pub const DEMO_PASSWORD: &str = "password";

static CREDENTIALS: OnceLock<Arc<InMemoryCredentialStore>> = OnceLock::new();

/// Demo accounts, hashed once per test binary.
pub fn demo_credentials() -> Arc<InMemoryCredentialStore> {
    CREDENTIALS
        .get_or_init(|| {
            Arc::new(
                InMemoryCredentialStore::with_demo_accounts(DEMO_PASSWORD)
                    .expect("seed demo accounts"),
            )
        })
        .clone()
}

pub fn settings(ttl: Duration) -> SessionSettings {
    SessionSettings {
        ttl,
        ..SessionSettings::default()
    }
}

/// Manager on the system clock.
pub fn manager(ttl: Duration) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        demo_credentials(),
        settings(ttl),
    ))
}

/// Manager on a clock the test moves by hand.
pub fn manual_manager(ttl: Duration) -> (Arc<SessionManager>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let manager = SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        demo_credentials(),
        settings(ttl),
    )
    .with_clock(clock.clone());
    (Arc::new(manager), clock)
}

pub fn test_config() -> Config {
    Config::default()
}

pub fn test_app() -> Router {
    test_app_with(manager(Duration::hours(24)))
}

pub fn test_app_with(sessions: Arc<SessionManager>) -> Router {
    app(AppState::new(sessions, test_config()))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("build request")
}

pub fn anonymous_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
