use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};

use crate::{
    error::AppError,
    middleware::session_token,
    models::navigation::{NavigationOutcome, NavigationQuery},
    services::navigation,
    state::AppState,
};

pub async fn navigate(
    State(state): State<AppState>,
    Query(query): Query<NavigationQuery>,
    headers: HeaderMap,
) -> Result<Json<NavigationOutcome>, AppError> {
    let token = session_token(&headers);
    let outcome = navigation::navigate(&state.sessions, token.as_ref(), &query.path).await?;
    tracing::debug!(path = %query.path, ?outcome, "Navigation guarded");
    Ok(Json(outcome))
}
