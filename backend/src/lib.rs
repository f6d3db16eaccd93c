pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod types;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, SessionStoreKind};
use crate::repositories::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::services::{InMemoryCredentialStore, SessionManager, SessionSettings};
use crate::state::AppState;

/// Wire the session store and credential store selected by `config`.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let store: Arc<dyn SessionStore> = match config.session_store {
        SessionStoreKind::Memory => Arc::new(InMemorySessionStore::new()),
        SessionStoreKind::Redis => {
            let pool = db::redis::create_redis_pool(&config).await?;
            Arc::new(RedisSessionStore::new(pool))
        }
    };

    let password = config.demo_account_password.clone();
    let seed = config.seed_demo_accounts;
    // Hashing is CPU bound.
    let credentials = tokio::task::spawn_blocking(move || {
        if seed {
            InMemoryCredentialStore::with_demo_accounts(&password)
        } else {
            InMemoryCredentialStore::new()
        }
    })
    .await??;
    if credentials.is_empty() {
        tracing::warn!("No accounts configured; every login will be rejected");
    } else {
        tracing::info!(accounts = credentials.len(), "Seeded demo accounts");
    }

    let sessions = SessionManager::new(
        store,
        Arc::new(credentials),
        SessionSettings::from_config(&config),
    );
    Ok(AppState::new(Arc::new(sessions), config))
}

pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/roles", get(handlers::auth::roles))
        .route("/api/navigation", get(handlers::navigation::navigate));

    let session_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    let dashboard_routes = Router::new()
        .route(
            "/api/dashboard/{slug}",
            get(handlers::dashboard::dashboard),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_role,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(dashboard_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(24 * 60 * 60));

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        // Cookies only travel cross-origin to an explicit allow-list.
        layer.allow_origin(origins).allow_credentials(true)
    }
}
