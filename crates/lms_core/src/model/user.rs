//! Users and roles.

use super::{impl_entity, EntityId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Dashboard role; decides which pages a user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Hr,
    Employee,
    Candidate,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [Self::Admin, Self::Hr, Self::Employee, Self::Candidate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Hr => "hr",
            Self::Employee => "employee",
            Self::Candidate => "candidate",
        }
    }

    /// HR and admin share the management dashboards.
    pub fn is_manager(self) -> bool {
        matches!(self, Self::Admin | Self::Hr)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "hr" => Ok(Self::Hr),
            "employee" => Ok(Self::Employee),
            "candidate" => Ok(Self::Candidate),
            other => Err(format!(
                "unknown role `{other}`; expected admin|hr|employee|candidate"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    /// Earned badge ids; never contains duplicates when written by the store.
    #[serde(default)]
    pub badges: Vec<EntityId>,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub batch_id: Option<EntityId>,
    #[serde(default)]
    pub last_login_at: Option<i64>,
    pub created_at: i64,
}

impl_entity!(User, "lms_users");

impl User {
    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.badges.iter().any(|id| id == badge_id)
    }
}

/// Input for creating a user; identity is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            department: None,
            position: None,
        }
    }

    pub fn into_user(self) -> User {
        User {
            id: EntityId::new(),
            name: self.name,
            email: self.email,
            role: self.role,
            department: self.department,
            position: self.position,
            avatar_url: None,
            status: UserStatus::Active,
            badges: Vec::new(),
            points: 0,
            batch_id: None,
            last_login_at: None,
            created_at: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UserRole;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(" HR ".parse::<UserRole>().unwrap(), UserRole::Hr);
        assert!("teacher".parse::<UserRole>().is_err());
    }

    #[test]
    fn role_serializes_as_snake_case() {
        let json = serde_json::to_string(&UserRole::Candidate).unwrap();
        assert_eq!(json, "\"candidate\"");
    }
}
