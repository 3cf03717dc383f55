//! Composition root — owns the store and every state container.
//!
//! Consumers receive an `AppState` (or one of its `Arc` handles) explicitly;
//! nothing looks state up globally.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::navigation::{Navigator, Route};
use crate::onboarding::{JumpPolicy, OnboardingMachine};
use crate::session::{MemberDirectory, SessionStore};
use crate::store::{KeyValueMedium, LibSqlMedium, SafeStore};
use crate::workspaces::WorkspaceRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: SafeStore,
    pub workspaces: Arc<WorkspaceRegistry>,
    pub sessions: Arc<SessionStore>,
    pub onboarding: Arc<OnboardingMachine>,
    pub directory: Arc<MemberDirectory>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppState {
    /// Wire the containers over one store. State is empty until
    /// [`hydrate`](Self::hydrate) runs.
    pub fn new(
        medium: Arc<dyn KeyValueMedium>,
        jump_policy: JumpPolicy,
        directory: MemberDirectory,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let store = SafeStore::new(medium);
        Self {
            workspaces: WorkspaceRegistry::new(store.clone()),
            sessions: SessionStore::new(store.clone()),
            onboarding: OnboardingMachine::new(store.clone(), jump_policy),
            directory: Arc::new(directory),
            navigator,
            store,
        }
    }

    /// Open the configured database and member directory, then hydrate.
    pub async fn open(config: &AppConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let medium = if config.db_path == ":memory:" {
            LibSqlMedium::new_memory(&config.namespace).await?
        } else {
            LibSqlMedium::new_local(Path::new(&config.db_path), &config.namespace).await?
        };
        info!(namespace = medium.namespace(), "Using state namespace");
        let medium: Arc<dyn KeyValueMedium> = Arc::new(medium);

        let directory = match &config.members_path {
            Some(path) => MemberDirectory::load(path).await?,
            None => MemberDirectory::default(),
        };

        let state = Self::new(medium, config.jump_policy, directory, navigator);
        state.hydrate().await;
        Ok(state)
    }

    /// Restore every container from the store.
    pub async fn hydrate(&self) {
        self.workspaces.hydrate().await;
        self.onboarding.hydrate().await;
        let signed_in = self.sessions.current_session().await.is_some();
        info!(signed_in, "Application state hydrated");
    }

    /// Wipe all persisted state and return every container to its defaults.
    ///
    /// Ends any team session without a sign-out redirect; the UI is sent to
    /// the onboarding wizard instead.
    pub async fn reset(&self) {
        self.workspaces.clear().await;
        self.onboarding.reset().await;
        self.sessions.clear().await;
        if !self.store.clear().await {
            warn!("Store could not be cleared; in-memory state was reset");
        }
        info!("Application state reset");
        self.navigator.navigate(Route::Onboarding);
    }
}
