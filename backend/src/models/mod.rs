//! Data models shared across the session services and API handlers.

pub mod authorization;
pub mod identity;
pub mod navigation;
pub mod session;
