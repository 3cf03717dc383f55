//! Workspaces — the tenant list shown in the dashboard and the one the user
//! is currently working in.

pub mod model;
pub mod registry;
pub mod routes;

pub use model::{Workspace, WorkspaceStatus};
pub use registry::{WorkspaceEvent, WorkspaceRegistry, WorkspaceRegistryState};
