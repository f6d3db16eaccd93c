use axum::{extract::Extension, Json};

use crate::models::{navigation::DashboardResponse, session::Session};

/// Reached only through `require_role`, which has already matched the slug.
pub async fn dashboard(Extension(session): Extension<Session>) -> Json<DashboardResponse> {
    Json(DashboardResponse::from(&session.identity))
}
