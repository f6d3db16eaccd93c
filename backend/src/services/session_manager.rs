//! Session lifecycle: issue, resolve, refresh and revoke.
//!
//! All state changes are compare-and-swap against the stored revision. A
//! writer that loses the race re-reads the session and decides again, so two
//! tabs refreshing and logging out at once never overwrite each other.

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::error::AuthError;
use crate::models::authorization::{Decision, DenyReason};
use crate::models::identity::Role;
use crate::models::session::{Session, SessionState};
use crate::repositories::session_store::SessionStore;
use crate::services::authorization;
use crate::services::credential_store::{CredentialError, CredentialStore};
use crate::types::SessionId;
use crate::utils::time::{Clock, SystemClock};

/// Upper bound on re-reads after losing a compare-and-swap.
const MAX_SWAP_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Lifetime granted at login and added on each refresh.
    pub ttl: Duration,
    /// Refresh never pushes expiry past `issued_at + max_lifetime`.
    pub max_lifetime: Duration,
    /// Budget for a single credential check.
    pub credential_timeout: std::time::Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            max_lifetime: Duration::days(7),
            credential_timeout: std::time::Duration::from_secs(3),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: Duration::seconds(config.session_ttl_secs as i64),
            max_lifetime: Duration::seconds(config.session_max_lifetime_secs as i64),
            credential_timeout: std::time::Duration::from_millis(config.credential_timeout_ms),
        }
    }
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
}

fn contention() -> AuthError {
    AuthError::Storage(anyhow!(
        "session changed concurrently {} times; giving up",
        MAX_SWAP_ATTEMPTS
    ))
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            store,
            credentials,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Verify credentials and issue a new `Active` session.
    ///
    /// Empty inputs fail with `InvalidCredentials` before the credential
    /// store is contacted. A store timeout or outage is `UpstreamUnavailable`.
    pub async fn create_session(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Session, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || secret.is_empty() {
            tracing::debug!("Login rejected before verification: empty identifier or secret");
            return Err(AuthError::InvalidCredentials);
        }

        let verification = tokio::time::timeout(
            self.settings.credential_timeout,
            self.credentials.verify(identifier, secret),
        )
        .await;

        let identity = match verification {
            Ok(Ok(identity)) => identity,
            Ok(Err(CredentialError::Rejected)) => {
                tracing::debug!(identifier, "Credentials rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Ok(Err(CredentialError::Unavailable(err))) => {
                tracing::warn!(error = ?err, "Credential store unavailable");
                return Err(AuthError::UpstreamUnavailable);
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.settings.credential_timeout.as_millis() as u64,
                    "Credential verification timed out"
                );
                return Err(AuthError::UpstreamUnavailable);
            }
        };

        let now = self.clock.now();
        // Built completely before the single write that makes it visible.
        let expires_at = now
            .checked_add_signed(self.settings.ttl)
            .ok_or_else(|| anyhow!("session TTL overflows the calendar"))?;
        let session = Session::issue(identity, now, expires_at);
        self.store.put(&session).await?;

        tracing::info!(
            identity = %session.identity.id,
            role = %session.identity.role,
            expires_at = %session.expires_at,
            "Session created"
        );

        match self.store.purge_expired(now).await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged lapsed sessions"),
            Err(err) => tracing::warn!(error = ?err, "Failed to purge lapsed sessions"),
        }

        Ok(session)
    }

    /// Look a session up, expiring it on the way if its time is up.
    ///
    /// Returns `None` for unknown, expired and revoked sessions.
    pub async fn resolve_session(&self, id: &SessionId) -> Result<Option<Session>, AuthError> {
        for _ in 0..MAX_SWAP_ATTEMPTS {
            let Some(session) = self.store.get(id).await? else {
                return Ok(None);
            };
            if !session.is_active() {
                return Ok(None);
            }
            if !session.has_lapsed(self.clock.now()) {
                return Ok(Some(session));
            }

            let expired = session.transitioned(SessionState::Expired);
            if self
                .store
                .compare_and_swap(session.revision, &expired)
                .await?
            {
                tracing::debug!(identity = %session.identity.id, "Session expired");
                return Ok(None);
            }
        }
        Err(contention())
    }

    /// Revoke a session. Unknown or already revoked ids are a no-op.
    pub async fn revoke_session(&self, id: &SessionId) -> Result<(), AuthError> {
        for _ in 0..MAX_SWAP_ATTEMPTS {
            let Some(session) = self.store.get(id).await? else {
                return Ok(());
            };
            if !session.state.can_transition_to(SessionState::Revoked) {
                return Ok(());
            }

            let revoked = session.transitioned(SessionState::Revoked);
            if self
                .store
                .compare_and_swap(session.revision, &revoked)
                .await?
            {
                tracing::info!(
                    identity = %session.identity.id,
                    previous_state = session.state.as_str(),
                    "Session revoked"
                );
                return Ok(());
            }
        }
        Err(contention())
    }

    /// Push the expiry of an `Active` session out by one TTL.
    pub async fn refresh(&self, id: &SessionId) -> Result<Session, AuthError> {
        for _ in 0..MAX_SWAP_ATTEMPTS {
            let Some(session) = self.store.get(id).await? else {
                return Err(AuthError::SessionNotActive);
            };
            if !session.is_active() {
                return Err(AuthError::SessionNotActive);
            }

            if session.has_lapsed(self.clock.now()) {
                let expired = session.transitioned(SessionState::Expired);
                if self
                    .store
                    .compare_and_swap(session.revision, &expired)
                    .await?
                {
                    return Err(AuthError::SessionNotActive);
                }
                continue;
            }

            let ceiling = session
                .issued_at
                .checked_add_signed(self.settings.max_lifetime)
                .ok_or_else(|| anyhow!("session max lifetime overflows the calendar"))?;
            let extended = session
                .expires_at
                .checked_add_signed(self.settings.ttl)
                .ok_or_else(|| anyhow!("session TTL overflows the calendar"))?;
            let expires_at = extended.min(ceiling).max(session.expires_at);
            let refreshed = session.extended(expires_at);
            if self
                .store
                .compare_and_swap(session.revision, &refreshed)
                .await?
            {
                tracing::debug!(
                    identity = %refreshed.identity.id,
                    expires_at = %refreshed.expires_at,
                    "Session refreshed"
                );
                return Ok(refreshed);
            }
        }
        Err(contention())
    }

    /// The caller's live session, if they presented a token for one.
    pub async fn current_session(
        &self,
        token: Option<&SessionId>,
    ) -> Result<Option<Session>, AuthError> {
        match token {
            Some(id) => self.resolve_session(id).await,
            None => Ok(None),
        }
    }

    /// Resolve the caller's session and run it through the gate.
    pub async fn authorize(
        &self,
        token: Option<&SessionId>,
        required_role: Option<Role>,
    ) -> Result<Decision, AuthError> {
        let session = self.current_session(token).await?;
        let decision = authorization::authorize(session.as_ref(), required_role, self.clock.now());
        if let (Decision::Deny(DenyReason::InsufficientRole), Some(session)) = (decision, &session)
        {
            tracing::debug!(
                identity = %session.identity.id,
                role = %session.identity.role,
                required = ?required_role,
                "Role mismatch"
            );
        }
        Ok(decision)
    }
}
