pub mod redis_session_store;
pub mod session_store;

pub use redis_session_store::RedisSessionStore;
pub use session_store::{InMemorySessionStore, SessionStore};
