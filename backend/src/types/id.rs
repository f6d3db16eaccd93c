//! Typed ID wrappers for compile-time type safety.
//!
//! Identity identifiers are UUIDs; session identifiers are opaque tokens and
//! live in [`SessionId`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(Uuid);

impl IdentityId {
    /// Creates a new random ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Number of random bytes behind every session token (256 bits).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Opaque, unguessable session token.
///
/// Generated from the OS CSPRNG and rendered as unpadded base64url so it can
/// travel in cookies and `Authorization` headers unchanged.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Draws a fresh token from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are bearer credentials; keep them out of Debug output.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionId({prefix}…)")
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_id_roundtrips_through_string() {
        let id = IdentityId::new();
        let parsed: IdentityId = id.to_string().parse().expect("parse id");
        assert_eq!(id, parsed);
    }

    #[test]
    fn identity_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<IdentityId>().is_err());
        assert!(serde_json::from_str::<IdentityId>("\"not-a-uuid\"").is_err());
    }

    #[test]
    fn identity_id_serializes_as_plain_uuid_string() {
        let id = IdentityId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn session_id_is_url_safe_and_sized() {
        let id = SessionId::generate();
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        // 32 bytes -> 43 base64url characters.
        assert_eq!(id.as_str().len(), 43);
    }

    #[test]
    fn session_ids_do_not_repeat() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn session_id_debug_hides_token() {
        let id = SessionId::from("abcdefghijklmnop");
        let rendered = format!("{:?}", id);
        assert!(rendered.contains("abcdef"));
        assert!(!rendered.contains("ghijklmnop"));
    }
}
