//! Team member sessions for the team portal.

pub mod directory;
pub mod model;
pub mod routes;
pub mod store;

pub use directory::{MemberDirectory, filter_members};
pub use model::{Role, TeamMember, TeamSession};
pub use store::{SessionEvent, SessionStore};
