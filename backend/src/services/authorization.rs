//! The authorization gate: a pure decision over a session and a role.

use chrono::{DateTime, Utc};

use crate::models::authorization::{Decision, DenyReason};
use crate::models::identity::Role;
use crate::models::session::Session;

/// Decide whether `session` may reach something guarded by `required_role`.
///
/// Roles match exactly; there is no hierarchy, so a ministry session does not
/// pass a district-official gate.
pub fn authorize(
    session: Option<&Session>,
    required_role: Option<Role>,
    now: DateTime<Utc>,
) -> Decision {
    let Some(session) = session.filter(|session| session.is_live(now)) else {
        return Decision::Deny(DenyReason::NotAuthenticated);
    };

    match required_role {
        None => Decision::Allow,
        Some(role) if role == session.identity.role => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::InsufficientRole),
    }
}
