//! Team member directory and the pre-sign-in search filter.

use std::path::Path;

use tracing::info;

use super::model::TeamMember;
use crate::error::DirectoryError;

/// Members whose `name + " " + email` contains `query`, case-insensitively.
///
/// A blank query matches everyone. Order is preserved.
pub fn filter_members<'a>(members: &'a [TeamMember], query: &str) -> Vec<&'a TeamMember> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return members.iter().collect();
    }
    members
        .iter()
        .filter(|m| format!("{} {}", m.name, m.email).to_lowercase().contains(&needle))
        .collect()
}

/// Read-only list of team members supplied from outside the state layer.
#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    members: Vec<TeamMember>,
}

impl MemberDirectory {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members }
    }

    /// Load a JSON array of members from `path`.
    pub async fn load(path: &Path) -> Result<Self, DirectoryError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DirectoryError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let members: Vec<TeamMember> =
            serde_json::from_str(&text).map_err(|source| DirectoryError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        info!(path = %path.display(), count = members.len(), "Member directory loaded");
        Ok(Self { members })
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    /// Search the directory (see [`filter_members`]).
    pub fn search(&self, query: &str) -> Vec<&TeamMember> {
        filter_members(&self.members, query)
    }
}
