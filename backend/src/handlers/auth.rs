use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::{AppError, AuthError},
    middleware::session_token,
    models::{
        identity::{Role, RoleResponse},
        session::{CurrentSessionResponse, LoginRequest, Session, SessionResponse},
    },
    state::AppState,
    utils::cookies::{build_clear_session_cookie, build_session_cookie},
};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    payload.validate()?;

    let session = state
        .sessions
        .create_session(&payload.identifier, &payload.secret)
        .await?;

    let cookie = session_cookie(&state, &session)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(CurrentSessionResponse::from(&session)),
    )
        .into_response())
}

/// Unknown or already revoked tokens still sign out. A failed revocation is
/// reported, since the token would otherwise stay usable.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie = build_clear_session_cookie(state.config.cookie_options());
    let revoked = match session_token(&headers) {
        Some(token) => state.sessions.revoke_session(&token).await,
        None => Ok(()),
    };

    match revoked {
        Ok(()) => (
            [(header::SET_COOKIE, cookie)],
            Json(json!({ "message": "Signed out" })),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to revoke session on logout");
            ([(header::SET_COOKIE, cookie)], AppError::from(err)).into_response()
        }
    }
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = session_token(&headers).ok_or(AuthError::SessionNotActive)?;
    let session = state.sessions.refresh(&token).await?;

    let cookie = session_cookie(&state, &session)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "session": SessionResponse::from(&session) })),
    )
        .into_response())
}

/// Behind `require_session`, so the session is known to be live.
pub async fn me(Extension(session): Extension<Session>) -> Json<CurrentSessionResponse> {
    Json(CurrentSessionResponse::from(&session))
}

pub async fn roles() -> Json<Vec<RoleResponse>> {
    Json(Role::ALL.into_iter().map(RoleResponse::from).collect())
}

fn session_cookie(state: &AppState, session: &Session) -> Result<HeaderValue, AppError> {
    let remaining_ms = (session.expires_at - state.sessions.now())
        .num_milliseconds()
        .max(0) as u64;
    let max_age = std::time::Duration::from_secs(remaining_ms.div_ceil(1000));
    let cookie = build_session_cookie(
        session.id.as_str(),
        max_age,
        state.config.cookie_options(),
    );
    HeaderValue::from_str(&cookie).map_err(|e| AppError::InternalServerError(e.into()))
}
