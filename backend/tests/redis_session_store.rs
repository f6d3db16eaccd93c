use chrono::{Duration, Utc};
use std::env;

use gramdarpan_backend::{
    db::redis::create_redis_pool,
    models::{
        identity::{Identity, Role},
        session::{Session, SessionState},
    },
    repositories::{RedisSessionStore, SessionStore},
};

mod support;

#[tokio::test]
async fn create_redis_pool_requires_url() {
    let config = support::test_config();
    assert!(config.redis_url.is_none());
    assert!(create_redis_pool(&config).await.is_err());
}

/// Runs only against a real server named by `TEST_REDIS_URL`.
async fn redis_store() -> Option<RedisSessionStore> {
    let url = env::var("TEST_REDIS_URL").ok()?;
    let mut config = support::test_config();
    config.redis_url = Some(url);
    config.redis_pool_size = 2;
    let pool = create_redis_pool(&config).await.expect("redis pool");
    Some(RedisSessionStore::new(pool))
}

fn session() -> Session {
    let now = Utc::now();
    Session::issue(
        Identity::new("Priya Sharma", "agency@gramdarpan.com", Role::Agency, None),
        now,
        now + Duration::minutes(5),
    )
}

#[tokio::test]
async fn redis_store_round_trips_and_swaps_on_revision() {
    let Some(store) = redis_store().await else {
        eprintln!("TEST_REDIS_URL not set; skipping");
        return;
    };

    let session = session();
    store.put(&session).await.expect("put");
    assert_eq!(store.get(&session.id).await.unwrap(), Some(session.clone()));

    let revoked = session.transitioned(SessionState::Revoked);
    assert!(store.compare_and_swap(session.revision, &revoked).await.unwrap());

    // A writer still holding the old revision loses.
    let stale = session.transitioned(SessionState::Expired);
    assert!(!store.compare_and_swap(session.revision, &stale).await.unwrap());
    assert_eq!(
        store.get(&session.id).await.unwrap().map(|s| s.state),
        Some(SessionState::Revoked)
    );

    store.delete(&session.id).await.unwrap();
    assert_eq!(store.get(&session.id).await.unwrap(), None);
    assert!(!store.compare_and_swap(revoked.revision, &revoked).await.unwrap());
}
