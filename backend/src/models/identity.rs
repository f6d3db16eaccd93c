//! Models that represent authenticated principals and their role metadata.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::types::IdentityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Closed set of roles recognised by the dashboard.
///
/// Roles are flat and mutually exclusive: no role implies another.
pub enum Role {
    /// Submits survey data and village updates.
    FieldWorker,
    /// Implementing agency managing assigned tasks.
    Agency,
    /// Approves submissions and monitors villages in a district.
    DistrictOfficial,
    /// Views district dashboards and analytics for a state.
    StateOfficial,
    /// National-level oversight.
    Ministry,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::FieldWorker,
        Role::Agency,
        Role::DistrictOfficial,
        Role::StateOfficial,
        Role::Ministry,
    ];

    /// Returns the canonical kebab-case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::FieldWorker => "field-worker",
            Role::Agency => "agency",
            Role::DistrictOfficial => "district-official",
            Role::StateOfficial => "state-official",
            Role::Ministry => "ministry",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::FieldWorker => "Field Worker",
            Role::Agency => "Agency",
            Role::DistrictOfficial => "District Official",
            Role::StateOfficial => "State Official",
            Role::Ministry => "Ministry",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::FieldWorker => "Submit survey data and updates",
            Role::Agency => "Manage assigned tasks and progress",
            Role::DistrictOfficial => "Approve submissions and monitor villages",
            Role::StateOfficial => "View district dashboards and analytics",
            Role::Ministry => "National-level oversight and analytics",
        }
    }

    /// Path segment of the role's own dashboard under `/dashboard/`.
    pub fn dashboard_slug(&self) -> &'static str {
        match self {
            Role::FieldWorker => "field-worker",
            Role::Agency => "agency",
            Role::DistrictOfficial => "district",
            Role::StateOfficial => "state",
            Role::Ministry => "ministry",
        }
    }

    pub fn dashboard_path(&self) -> String {
        format!("/dashboard/{}", self.dashboard_slug())
    }

    /// Looks a role up by its dashboard slug (`district`, `state`, ...).
    pub fn from_dashboard_slug(slug: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| role.dashboard_slug() == slug)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::unknown_variant(
                &s,
                &[
                    "field-worker",
                    "agency",
                    "district-official",
                    "state-official",
                    "ministry",
                ],
            )
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Geographic binding narrowing which data a role may act on.
pub struct Scope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Scope {
    pub fn district(district: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            district: Some(district.into()),
            state: Some(state.into()),
        }
    }

    pub fn state(state: impl Into<String>) -> Self {
        Self {
            district: None,
            state: Some(state.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// An authenticated principal as handed out by the credential store.
pub struct Identity {
    /// Unique identifier for the identity.
    pub id: IdentityId,
    /// Human-readable name.
    pub display_name: String,
    /// Contact address; doubles as the login identifier.
    pub contact: String,
    /// The single role held by this identity.
    pub role: Role,
    /// Geographic binding; `None` for national roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// Optional profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn new(
        display_name: impl Into<String>,
        contact: impl Into<String>,
        role: Role,
        scope: Option<Scope>,
    ) -> Self {
        Self {
            id: IdentityId::new(),
            display_name: display_name.into(),
            contact: contact.into(),
            role,
            scope,
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Role catalogue entry exposed to the login page.
pub struct RoleResponse {
    pub value: Role,
    pub label: String,
    pub description: String,
    pub dashboard_path: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            value: role,
            label: role.label().to_string(),
            description: role.description().to_string(),
            dashboard_path: role.dashboard_path(),
        }
    }
}
