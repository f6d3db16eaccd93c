pub mod authorization;
pub mod credential_store;
pub mod navigation;
pub mod session_manager;

pub use credential_store::{CredentialStore, InMemoryCredentialStore};
pub use session_manager::{SessionManager, SessionSettings};
