//! Team member and session data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission level of a team member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Staff,
    Manager,
    Admin,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Staff => "Staff",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
            Self::SuperAdmin => "Super Admin",
        };
        write!(f, "{s}")
    }
}

/// A member of the business team, as listed in the member directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// The signed-in team member.
///
/// Stored as JSON under `team_session`. Missing identity fields decode to
/// empty strings and a missing role to `Staff`, so a partially written record
/// still yields a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSession {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl TeamSession {
    /// Start a session for `member`, stamped now.
    pub fn for_member(member: &TeamMember) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            role: member.role,
            signed_in_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serde_matches_display() {
        for role in [Role::Staff, Role::Manager, Role::Admin, Role::SuperAdmin] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
        let parsed: Role = serde_json::from_str("\"Super Admin\"").unwrap();
        assert_eq!(parsed, Role::SuperAdmin);
    }

    #[test]
    fn session_missing_name_still_decodes() {
        let session: TeamSession = serde_json::from_str(r#"{"id":"m1","role":"Staff"}"#).unwrap();
        assert_eq!(session.id, "m1");
        assert_eq!(session.name, "");
        assert_eq!(session.role, Role::Staff);
        assert!(session.signed_in_at.is_none());
    }

    #[test]
    fn session_missing_role_defaults_to_staff() {
        let session: TeamSession =
            serde_json::from_str(r#"{"id":"m2","name":"Ana","email":"ana@x.example"}"#).unwrap();
        assert_eq!(session.role, Role::Staff);
    }

    #[test]
    fn for_member_copies_identity() {
        let member = TeamMember {
            id: "m3".into(),
            name: "Lee".into(),
            email: "lee@x.example".into(),
            role: Role::Manager,
        };
        let session = TeamSession::for_member(&member);
        assert_eq!(session.id, "m3");
        assert_eq!(session.role, Role::Manager);
        assert!(session.signed_in_at.is_some());

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("signedInAt").is_some());
    }
}
