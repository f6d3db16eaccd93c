use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gramdarpan_backend::config::{mask_secret, mask_url, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gramdarpan_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        session_ttl_secs = config.session_ttl_secs,
        session_max_lifetime_secs = config.session_max_lifetime_secs,
        credential_timeout_ms = config.credential_timeout_ms,
        session_store = ?config.session_store,
        redis_url = %config.redis_url.as_deref().map(mask_url).unwrap_or_default(),
        cookie_secure = config.cookie_secure,
        cookie_same_site = ?config.cookie_same_site,
        cors_allow_origins = ?config.cors_allow_origins,
        seed_demo_accounts = config.seed_demo_accounts,
        demo_account_password = %mask_secret(&config.demo_account_password),
        "Loaded configuration from environment/.env"
    );

    let addr = config.bind_addr;
    let state = gramdarpan_backend::build_state(config).await?;
    let app = gramdarpan_backend::app(state);

    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
