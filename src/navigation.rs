//! Navigation capability invoked after sign-in, sign-out and onboarding.
//!
//! The state layer never awaits navigation; it only announces where the UI
//! should go next.

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

/// Destinations the state layer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// The onboarding wizard.
    Onboarding,
    /// The main business dashboard.
    Dashboard,
    /// Team member sign-in screen.
    TeamLogin,
    /// Authenticated team member area.
    TeamPortal,
}

impl Route {
    /// Path of the route in the dashboard UI.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Onboarding => "/onboarding",
            Self::Dashboard => "/dashboard",
            Self::TeamLogin => "/team/login",
            Self::TeamPortal => "/team/dashboard",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Router capability. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator for headless runs: records the request in the log.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigation requested");
    }
}

/// Navigator that remembers every request, for callers that relay routes.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All routes requested so far, oldest first.
    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }

    /// Most recent route, if any.
    pub fn last(&self) -> Option<Route> {
        self.routes().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}
