use std::sync::Arc;

use crate::{config::Config, services::session_manager::SessionManager};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub config: Config,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, config: Config) -> Self {
        Self { sessions, config }
    }
}
