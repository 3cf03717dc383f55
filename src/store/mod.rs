//! Persistence layer — raw key-value media and the fault-tolerant `SafeStore`.

pub mod libsql_backend;
pub mod memory;
pub mod safe;
pub mod schema;
pub mod traits;

pub use libsql_backend::LibSqlMedium;
pub use memory::MemoryMedium;
pub use safe::{Loaded, SafeStore};
pub use traits::KeyValueMedium;

/// Keys of the persisted records.
pub mod keys {
    /// Ordered list of all workspaces.
    pub const WORKSPACES: &str = "workspaces";
    /// Id of the selected workspace.
    pub const SELECTED_WORKSPACE_ID: &str = "selectedWorkspaceId";
    /// Signed-in team member.
    pub const TEAM_SESSION: &str = "team_session";
    /// Onboarding wizard position and captured step data.
    pub const ONBOARDING_STATE: &str = "onboarding_state";
}
