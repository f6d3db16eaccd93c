//! Authorization decisions returned by the gate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Why a navigation or action was refused.
pub enum DenyReason {
    /// No session, or the session is expired or revoked.
    NotAuthenticated,
    /// Authenticated, but the identity's role does not match the gate.
    InsufficientRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
/// Outcome of an authorization check. Denials are values, not errors.
pub enum Decision {
    Allow,
    Deny(DenyReason),
}
