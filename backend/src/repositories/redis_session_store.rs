//! Redis-backed session store shared between server instances.
//!
//! Sessions are stored as JSON under `session:{id}` with a Redis expiry that
//! tracks `expires_at`, so lapsed records are evicted by Redis itself.

use async_trait::async_trait;
use bb8_redis::redis::{self, AsyncCommands};
use chrono::{DateTime, Utc};
use tracing::Instrument;

use crate::db::redis::RedisPool;
use crate::models::session::Session;
use crate::repositories::session_store::SessionStore;
use crate::types::SessionId;

/// Swaps the value only while the stored revision matches ARGV[1].
const COMPARE_AND_SWAP_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
  return 0
end
local decoded = cjson.decode(current)
if tonumber(decoded['revision']) ~= tonumber(ARGV[1]) then
  return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
return 1
"#;

pub struct RedisSessionStore {
    pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn session_key(id: &SessionId) -> String {
        format!("session:{}", id.as_str())
    }

    /// Seconds until Redis may evict the record; never zero.
    fn ttl_seconds(session: &Session, now: DateTime<Utc>) -> u64 {
        (session.expires_at - now).num_seconds().max(1) as u64
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, id: &SessionId) -> anyhow::Result<Option<Session>> {
        async {
            let mut conn = self.pool.get().await?;
            let raw: Option<String> = conn.get(Self::session_key(id)).await?;
            raw.map(|value| serde_json::from_str::<Session>(&value).map_err(anyhow::Error::from))
                .transpose()
        }
        .instrument(tracing::debug_span!("redis_session_get"))
        .await
    }

    async fn put(&self, session: &Session) -> anyhow::Result<()> {
        async {
            let mut conn = self.pool.get().await?;
            let value = serde_json::to_string(session)?;
            conn.set_ex::<_, _, ()>(
                Self::session_key(&session.id),
                value,
                Self::ttl_seconds(session, Utc::now()),
            )
            .await?;
            Ok::<(), anyhow::Error>(())
        }
        .instrument(tracing::debug_span!("redis_session_put", identity = %session.identity.id))
        .await
    }

    async fn delete(&self, id: &SessionId) -> anyhow::Result<()> {
        async {
            let mut conn = self.pool.get().await?;
            conn.del::<_, ()>(Self::session_key(id)).await?;
            Ok::<(), anyhow::Error>(())
        }
        .instrument(tracing::debug_span!("redis_session_delete"))
        .await
    }

    async fn compare_and_swap(
        &self,
        expected_revision: u64,
        replacement: &Session,
    ) -> anyhow::Result<bool> {
        let span = tracing::debug_span!(
            "redis_session_compare_and_swap",
            expected_revision,
            state = replacement.state.as_str()
        );
        async {
            let mut conn = self.pool.get().await?;
            let value = serde_json::to_string(replacement)?;
            let swapped: i32 = redis::Script::new(COMPARE_AND_SWAP_SCRIPT)
                .key(Self::session_key(&replacement.id))
                .arg(expected_revision)
                .arg(value)
                .arg(Self::ttl_seconds(replacement, Utc::now()))
                .invoke_async(&mut *conn)
                .await?;
            Ok::<bool, anyhow::Error>(swapped == 1)
        }
        .instrument(span)
        .await
    }

    async fn purge_expired(&self, _cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        // Redis expiry already evicts lapsed keys.
        Ok(0)
    }
}
