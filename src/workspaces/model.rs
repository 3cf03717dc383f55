//! Workspace data model.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Colors assigned to new workspaces.
pub const PALETTE: &[&str] = &[
    "#6366F1", "#0EA5E9", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6",
];

/// Booking reference width when a record does not carry one.
pub const DEFAULT_MAX_DIGITS: u32 = 4;

/// Whether a workspace accepts bookings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkspaceStatus {
    #[default]
    Active,
    Inactive,
}

/// A business unit with its own booking configuration.
///
/// Stored in the `workspaces` record as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initials: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: WorkspaceStatus,
    #[serde(default)]
    pub booking_link: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_max_digits")]
    pub max_digits: u32,
}

fn default_max_digits() -> u32 {
    DEFAULT_MAX_DIGITS
}

impl Workspace {
    /// Create an active workspace with derived initials, color, link and prefix.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let name = name.into();
        let initials = initials_for(&name);
        let color = PALETTE
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("#6366F1")
            .to_string();
        Self {
            id: Uuid::new_v4().to_string(),
            booking_link: slugify(&name),
            prefix: initials.clone(),
            initials,
            color,
            email: email.into(),
            description: String::new(),
            status: WorkspaceStatus::Active,
            max_digits: DEFAULT_MAX_DIGITS,
            name,
        }
    }
}

/// Up to two uppercase initials from the first letters of the name's words.
pub fn initials_for(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Lowercase, hyphen-separated booking link slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
