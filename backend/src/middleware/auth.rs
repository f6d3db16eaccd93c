use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::{
        authorization::{Decision, DenyReason},
        identity::Role,
    },
    services::authorization,
    state::AppState,
    types::SessionId,
    utils::cookies::{extract_cookie_value, SESSION_COOKIE_NAME},
};

/// Requires a live session and stores it in the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers());
    let session = state
        .sessions
        .current_session(token.as_ref())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Gates `/api/dashboard/{slug}` on the role that owns the dashboard.
pub async fn require_role(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let role = Role::from_dashboard_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown dashboard: {}", slug)))?;

    let token = session_token(request.headers());
    let session = state.sessions.current_session(token.as_ref()).await?;
    match authorization::authorize(session.as_ref(), Some(role), state.sessions.now()) {
        Decision::Allow => {}
        Decision::Deny(DenyReason::NotAuthenticated) => {
            return Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            ))
        }
        Decision::Deny(DenyReason::InsufficientRole) => {
            return Err(AppError::Forbidden("Access denied".to_string()))
        }
    }

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    Ok(next.run(request).await)
}

/// Session token from `Authorization: Bearer`, falling back to the cookie.
pub fn session_token(headers: &HeaderMap) -> Option<SessionId> {
    let (auth_header, cookie_header) = extract_auth_headers(headers);
    auth_header
        .as_deref()
        .and_then(parse_bearer_token)
        .filter(|token| !token.is_empty())
        .map(SessionId::from)
        .or_else(|| {
            cookie_header
                .as_deref()
                .and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
                .map(SessionId::from)
        })
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim())
    } else {
        None
    }
}

fn extract_auth_headers(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned());
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned());
    (auth_header, cookie_header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parse_bearer_token_is_case_insensitive() {
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(parse_bearer_token("BEARER abc"), Some("abc"));
        assert_eq!(parse_bearer_token("Basic abc"), None);
        assert_eq!(parse_bearer_token("Bearer"), None);
    }

    #[test]
    fn session_token_prefers_bearer_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("gramdarpan_session=from-cookie"),
        );
        assert_eq!(
            session_token(&headers).map(|t| t.as_str().to_string()),
            Some("from-cookie".to_string())
        );

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            session_token(&headers).map(|t| t.as_str().to_string()),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn session_token_absent_without_credentials() {
        assert!(session_token(&HeaderMap::new()).is_none());
    }
}
