//! Route table and navigation guard for the dashboard.

use crate::error::AuthError;
use crate::models::authorization::{Decision, DenyReason};
use crate::models::identity::Role;
use crate::models::navigation::{NavigationOutcome, RouteAccess};
use crate::services::session_manager::SessionManager;
use crate::types::SessionId;

const PUBLIC_ROUTES: [&str; 5] = ["/", "/map", "/about", "/login", "/register"];
/// Public routes taking exactly one identifier segment.
const PUBLIC_PREFIXES: [&str; 2] = ["/village/", "/district/"];

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Look up the access requirement for `path`; `None` for unknown routes.
pub fn route_access(path: &str) -> Option<RouteAccess> {
    let path = normalize(path);
    if PUBLIC_ROUTES.contains(&path) {
        return Some(RouteAccess::Public);
    }
    let has_single_id = PUBLIC_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|id| !id.is_empty() && !id.contains('/'))
    });
    if has_single_id {
        return Some(RouteAccess::Public);
    }
    if path == "/dashboard" {
        return Some(RouteAccess::Authenticated);
    }
    path.strip_prefix("/dashboard/")
        .and_then(Role::from_dashboard_slug)
        .map(RouteAccess::Role)
}

/// Role required to render `access`, if any.
pub fn required_role(access: RouteAccess) -> Option<Role> {
    match access {
        RouteAccess::Role(role) => Some(role),
        RouteAccess::Public | RouteAccess::Authenticated => None,
    }
}

/// Map an authorization decision for `path` to what the client should do.
pub fn guard(path: &str, decision: Decision) -> NavigationOutcome {
    match route_access(path) {
        None => NavigationOutcome::NotFound,
        Some(RouteAccess::Public) => NavigationOutcome::Render,
        Some(_) => match decision {
            Decision::Allow => NavigationOutcome::Render,
            Decision::Deny(DenyReason::NotAuthenticated) => {
                NavigationOutcome::login(normalize(path))
            }
            Decision::Deny(DenyReason::InsufficientRole) => NavigationOutcome::landing(),
        },
    }
}

/// Resolve the caller's session only when the route is guarded.
pub async fn navigate(
    sessions: &SessionManager,
    token: Option<&SessionId>,
    path: &str,
) -> Result<NavigationOutcome, AuthError> {
    let access = match route_access(path) {
        None => return Ok(NavigationOutcome::NotFound),
        Some(RouteAccess::Public) => return Ok(NavigationOutcome::Render),
        Some(access) => access,
    };
    let decision = sessions.authorize(token, required_role(access)).await?;
    Ok(guard(path, decision))
}
