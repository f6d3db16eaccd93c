//! Models for the session lifecycle and the login payloads around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::identity::Identity;
use crate::types::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle state of a session. `Revoked` is terminal.
pub enum SessionState {
    Active,
    Expired,
    Revoked,
}

impl SessionState {
    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// `Active -> Expired`, `Active -> Revoked` and `Expired -> Revoked` are
    /// the only legal moves; nothing returns to `Active`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Active, SessionState::Expired)
                | (SessionState::Active, SessionState::Revoked)
                | (SessionState::Expired, SessionState::Revoked)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Expired => "expired",
            SessionState::Revoked => "revoked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One authenticated browsing period bound to a single identity.
pub struct Session {
    pub id: SessionId,
    pub identity: Identity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: SessionState,
    /// Bumped on every stored change; the store compares it on swap.
    pub revision: u64,
}

impl Session {
    /// Builds a fully formed `Active` session. Callers guarantee
    /// `expires_at > issued_at`.
    pub fn issue(identity: Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        debug_assert!(expires_at > issued_at);
        Self {
            id: SessionId::generate(),
            identity,
            issued_at,
            expires_at,
            state: SessionState::Active,
            revision: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn has_lapsed(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Active and not yet past its expiry.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && !self.has_lapsed(now)
    }

    /// Copy of this session moved to `state`, with the revision bumped.
    pub fn transitioned(&self, state: SessionState) -> Self {
        Self {
            state,
            revision: self.revision + 1,
            ..self.clone()
        }
    }

    /// Copy of this session with a new expiry, with the revision bumped.
    pub fn extended(&self, expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at,
            revision: self.revision + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Credentials submitted by a user attempting to sign in.
pub struct LoginRequest {
    #[validate(length(max = 254))]
    pub identifier: String,
    #[validate(length(max = 1024))]
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Session metadata safe to hand back to the browser.
pub struct SessionResponse {
    pub session_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: SessionState,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.as_str().to_string(),
            issued_at: session.issued_at,
            expires_at: session.expires_at,
            state: session.state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Returned by login and `me`.
pub struct CurrentSessionResponse {
    pub session: SessionResponse,
    pub identity: Identity,
    pub landing_path: String,
}

impl From<&Session> for CurrentSessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session: SessionResponse::from(session),
            identity: session.identity.clone(),
            landing_path: session.identity.role.dashboard_path(),
        }
    }
}
