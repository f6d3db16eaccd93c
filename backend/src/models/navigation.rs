//! Navigation guard payloads.

use serde::{Deserialize, Serialize};

use crate::models::identity::{Identity, Role};

/// Where the login page lives.
pub const LOGIN_PATH: &str = "/login";
/// Generic landing page for authenticated users.
pub const LANDING_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Access requirement attached to a route.
pub enum RouteAccess {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
/// What the presentation layer must do for a requested path.
pub enum NavigationOutcome {
    Render,
    /// Not signed in; `from` is replayed after login.
    RedirectToLogin { redirect_to: String, from: String },
    /// Signed in, wrong role; sent to the generic landing page.
    RedirectToLanding { redirect_to: String },
    NotFound,
}

impl NavigationOutcome {
    pub fn login(from: impl Into<String>) -> Self {
        NavigationOutcome::RedirectToLogin {
            redirect_to: LOGIN_PATH.to_string(),
            from: from.into(),
        }
    }

    pub fn landing() -> Self {
        NavigationOutcome::RedirectToLanding {
            redirect_to: LANDING_PATH.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Context a role dashboard renders with.
pub struct DashboardResponse {
    pub role: Role,
    pub label: String,
    pub dashboard_path: String,
    pub identity: Identity,
}

impl From<&Identity> for DashboardResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            role: identity.role,
            label: identity.role.label().to_string(),
            dashboard_path: identity.role.dashboard_path(),
            identity: identity.clone(),
        }
    }
}
