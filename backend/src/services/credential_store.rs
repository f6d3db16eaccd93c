//! Credential verification collaborator.
//!
//! The session manager only sees [`CredentialStore::verify`]. The in-memory
//! implementation holds Argon2 hashes and ships the demo accounts of the
//! public dashboard.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::models::identity::{Identity, Role, Scope};
use crate::utils::password::{hash_password, verify_password};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Unknown identifier or wrong secret; deliberately indistinguishable.
    #[error("credentials rejected")]
    Rejected,
    #[error("credential store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Check `secret` for `identifier`. Never called with empty inputs.
    async fn verify(&self, identifier: &str, secret: &str) -> Result<Identity, CredentialError>;
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    secret_hash: String,
}

/// Accounts held in process memory, keyed by lower-cased identifier.
#[derive(Debug)]
pub struct InMemoryCredentialStore {
    accounts: HashMap<String, Account>,
    // Verified against when the identifier is unknown so both paths cost the same.
    dummy_hash: String,
}

fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

impl InMemoryCredentialStore {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            accounts: HashMap::new(),
            dummy_hash: hash_password("gramdarpan-unknown-account")?,
        })
    }

    /// Register an account; the identity's `contact` is the login identifier.
    pub fn insert(&mut self, identity: Identity, secret: &str) -> anyhow::Result<()> {
        let secret_hash = hash_password(secret)?;
        self.accounts.insert(
            normalize_identifier(&identity.contact),
            Account {
                identity,
                secret_hash,
            },
        );
        Ok(())
    }

    pub fn with_account(mut self, identity: Identity, secret: &str) -> anyhow::Result<Self> {
        self.insert(identity, secret)?;
        Ok(self)
    }

    /// The five demo accounts, one per role, all sharing `password`.
    pub fn with_demo_accounts(password: &str) -> anyhow::Result<Self> {
        let mut store = Self::new()?;
        for identity in demo_identities() {
            store.insert(identity, password)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn verify(&self, identifier: &str, secret: &str) -> Result<Identity, CredentialError> {
        let account = self.accounts.get(&normalize_identifier(identifier)).cloned();
        let hash = account
            .as_ref()
            .map(|account| account.secret_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let secret = secret.to_string();

        // Argon2 is CPU bound; keep it off the async workers.
        let matches = tokio::task::spawn_blocking(move || verify_password(&secret, &hash))
            .await
            .map_err(|e| CredentialError::Unavailable(e.into()))?
            .map_err(CredentialError::Unavailable)?;

        match (account, matches) {
            (Some(account), true) => Ok(account.identity),
            _ => Err(CredentialError::Rejected),
        }
    }
}

pub fn demo_identities() -> Vec<Identity> {
    vec![
        Identity::new(
            "Rajesh Kumar",
            "field@gramdarpan.com",
            Role::FieldWorker,
            Some(Scope::district("Mumbai", "Maharashtra")),
        )
        .with_avatar("https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face"),
        Identity::new(
            "Priya Sharma",
            "agency@gramdarpan.com",
            Role::Agency,
            Some(Scope::district("Delhi", "Delhi")),
        )
        .with_avatar("https://images.unsplash.com/photo-1494790108755-2616b612b786?w=150&h=150&fit=crop&crop=face"),
        Identity::new(
            "Amit Singh",
            "district@gramdarpan.com",
            Role::DistrictOfficial,
            Some(Scope::district("Bangalore", "Karnataka")),
        )
        .with_avatar("https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face"),
        Identity::new(
            "Dr. Sunita Patel",
            "state@gramdarpan.com",
            Role::StateOfficial,
            Some(Scope::state("Gujarat")),
        )
        .with_avatar("https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=150&h=150&fit=crop&crop=face"),
        Identity::new(
            "Dr. Vikram Mehta",
            "ministry@gramdarpan.com",
            Role::Ministry,
            None,
        )
        .with_avatar("https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=150&h=150&fit=crop&crop=face"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district_official() -> Identity {
        Identity::new(
            "Amit Singh",
            "district@gramdarpan.com",
            Role::DistrictOfficial,
            Some(Scope::district("Bangalore", "Karnataka")),
        )
    }

    #[tokio::test]
    async fn verify_accepts_matching_secret_case_insensitively() {
        let identity = district_official();
        let store = InMemoryCredentialStore::new()
            .unwrap()
            .with_account(identity.clone(), "password")
            .unwrap();

        let verified = store
            .verify("  District@GramDarpan.com ", "password")
            .await
            .expect("valid credentials");
        assert_eq!(verified, identity);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_secret_and_unknown_identifier_alike() {
        let store = InMemoryCredentialStore::new()
            .unwrap()
            .with_account(district_official(), "password")
            .unwrap();

        let wrong_secret = store.verify("district@gramdarpan.com", "nope").await;
        let unknown = store.verify("nobody@gramdarpan.com", "password").await;
        assert!(matches!(wrong_secret, Err(CredentialError::Rejected)));
        assert!(matches!(unknown, Err(CredentialError::Rejected)));
    }

    #[test]
    fn demo_identities_cover_every_role_once() {
        let identities = demo_identities();
        for role in Role::ALL {
            assert_eq!(identities.iter().filter(|i| i.role == role).count(), 1);
        }
        let ministry = identities
            .iter()
            .find(|i| i.role == Role::Ministry)
            .unwrap();
        assert!(ministry.scope.is_none());
        let state = identities
            .iter()
            .find(|i| i.role == Role::StateOfficial)
            .unwrap();
        assert_eq!(state.scope, Some(Scope::state("Gujarat")));
    }
}
