//! Session persistence contract and its in-process implementation.
//!
//! The manager never mutates a stored session in place: every change goes
//! through [`SessionStore::compare_and_swap`], which only succeeds while the
//! stored revision still matches what the caller read.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::session::Session;
use crate::types::SessionId;

/// Key-value storage for sessions, keyed by session token.
///
/// This trait is designed to be mockable using mockall for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session by id.
    async fn get(&self, id: &SessionId) -> anyhow::Result<Option<Session>>;

    /// Store a fully formed session.
    async fn put(&self, session: &Session) -> anyhow::Result<()>;

    /// Remove a session. Missing ids are not an error.
    async fn delete(&self, id: &SessionId) -> anyhow::Result<()>;

    /// Replace the stored session with `replacement` if, and only if, the
    /// stored revision equals `expected_revision`. Returns whether the swap
    /// happened.
    async fn compare_and_swap(
        &self,
        expected_revision: u64,
        replacement: &Session,
    ) -> anyhow::Result<bool>;

    /// Drop sessions whose expiry is at or before `cutoff`.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64>;
}

/// Process-local store. Each operation is one critical section.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, HashMap<SessionId, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| anyhow!("session store lock poisoned"))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> anyhow::Result<Option<Session>> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn put(&self, session: &Session) -> anyhow::Result<()> {
        self.lock()?.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> anyhow::Result<()> {
        self.lock()?.remove(id);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        expected_revision: u64,
        replacement: &Session,
    ) -> anyhow::Result<bool> {
        let mut sessions = self.lock()?;
        match sessions.get_mut(&replacement.id) {
            Some(current) if current.revision == expected_revision => {
                *current = replacement.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::{Identity, Role};
    use crate::models::session::SessionState;
    use chrono::Duration;

    fn session(ttl: Duration) -> Session {
        let now = Utc::now();
        Session::issue(
            Identity::new("Priya Sharma", "agency@gramdarpan.com", Role::Agency, None),
            now,
            now + ttl,
        )
    }

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let store = InMemorySessionStore::new();
        let s = session(Duration::hours(1));

        store.put(&s).await.unwrap();
        assert_eq!(store.get(&s.id).await.unwrap(), Some(s.clone()));

        store.delete(&s.id).await.unwrap();
        assert_eq!(store.get(&s.id).await.unwrap(), None);
        // Deleting twice is fine.
        store.delete(&s.id).await.unwrap();
    }

    #[tokio::test]
    async fn compare_and_swap_rejects_stale_revision() {
        let store = InMemorySessionStore::new();
        let s = session(Duration::hours(1));
        store.put(&s).await.unwrap();

        let revoked = s.transitioned(SessionState::Revoked);
        assert!(store.compare_and_swap(0, &revoked).await.unwrap());

        // A second writer that read revision 0 loses.
        let expired = s.transitioned(SessionState::Expired);
        assert!(!store.compare_and_swap(0, &expired).await.unwrap());

        let stored = store.get(&s.id).await.unwrap().unwrap();
        assert_eq!(stored.state, SessionState::Revoked);
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn compare_and_swap_on_missing_session_is_false() {
        let store = InMemorySessionStore::new();
        let s = session(Duration::hours(1));
        assert!(!store
            .compare_and_swap(0, &s.transitioned(SessionState::Revoked))
            .await
            .unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn purge_drops_only_lapsed_sessions() {
        let store = InMemorySessionStore::new();
        let live = session(Duration::hours(1));
        let lapsed = session(Duration::seconds(1));
        store.put(&live).await.unwrap();
        store.put(&lapsed).await.unwrap();

        let removed = store
            .purge_expired(Utc::now() + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&live.id).await.unwrap().is_some());
    }
}
