//! WorkspaceRegistry — the workspace list and current selection, mirrored
//! into the `SafeStore`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use super::model::Workspace;
use crate::store::{SafeStore, keys};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// In-memory registry state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRegistryState {
    pub workspaces: Vec<Workspace>,
    pub selected_workspace: Option<Workspace>,
}

/// Change notifications for registry observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkspaceEvent {
    /// The workspace list was replaced.
    WorkspacesChanged { workspaces: Vec<Workspace> },
    /// The selection changed (including being cleared).
    SelectionChanged { selected: Option<Workspace> },
}

/// Shared workspace state container.
pub struct WorkspaceRegistry {
    store: SafeStore,
    state: RwLock<WorkspaceRegistryState>,
    tx: broadcast::Sender<WorkspaceEvent>,
}

impl WorkspaceRegistry {
    /// Create an empty registry. Call [`hydrate`](Self::hydrate) to load
    /// persisted state.
    pub fn new(store: SafeStore) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            store,
            state: RwLock::new(WorkspaceRegistryState::default()),
            tx,
        })
    }

    /// Subscribe to registry changes.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.tx.subscribe()
    }

    /// Restore the list and selection from the store.
    ///
    /// A stored selection id that no longer resolves leaves nothing selected
    /// and is removed from the store.
    pub async fn hydrate(&self) {
        let mut state = self.state.write().await;
        let workspaces: Vec<Workspace> =
            dedupe_by_id(self.store.get(keys::WORKSPACES, Vec::new()).await);

        let selected_id: Option<String> = self.store.get(keys::SELECTED_WORKSPACE_ID, None).await;
        let selected_workspace = selected_id.and_then(|id| {
            let found = workspaces.iter().find(|w| w.id == id).cloned();
            if found.is_none() {
                debug!(workspace_id = %id, "Stored selection no longer exists, dropping it");
            }
            found
        });
        if selected_workspace.is_none() {
            self.store.remove(keys::SELECTED_WORKSPACE_ID).await;
        }

        info!(
            count = workspaces.len(),
            selected = ?selected_workspace.as_ref().map(|w| w.id.as_str()),
            "Workspaces hydrated"
        );

        state.workspaces = workspaces;
        state.selected_workspace = selected_workspace;
    }

    /// All workspaces in display order.
    pub async fn workspaces(&self) -> Vec<Workspace> {
        self.state.read().await.workspaces.clone()
    }

    /// The selected workspace, if any.
    pub async fn selected_workspace(&self) -> Option<Workspace> {
        self.state.read().await.selected_workspace.clone()
    }

    /// Full snapshot of list and selection.
    pub async fn snapshot(&self) -> WorkspaceRegistryState {
        self.state.read().await.clone()
    }

    /// Select a workspace, or clear the selection with `None`.
    ///
    /// The selection is resolved by id against the current list so it always
    /// holds the list's version. An id that is not in the list clears the
    /// selection.
    pub async fn set_selected_workspace(&self, workspace: Option<Workspace>) {
        let selected = {
            let mut state = self.state.write().await;
            let resolved = workspace.and_then(|requested| {
                let found = state
                    .workspaces
                    .iter()
                    .find(|w| w.id == requested.id)
                    .cloned();
                if found.is_none() {
                    warn!(workspace_id = %requested.id, "Cannot select unknown workspace, clearing selection");
                }
                found
            });
            self.persist_selection(resolved.as_ref()).await;
            state.selected_workspace = resolved.clone();
            resolved
        };

        debug!(selected = ?selected.as_ref().map(|w| w.id.as_str()), "Workspace selection changed");
        let _ = self.tx.send(WorkspaceEvent::SelectionChanged { selected });
    }

    /// Select the workspace with `id`. Returns whether it exists.
    pub async fn select_by_id(&self, id: &str) -> bool {
        let selected = {
            let mut state = self.state.write().await;
            let Some(found) = state.workspaces.iter().find(|w| w.id == id).cloned() else {
                return false;
            };
            self.persist_selection(Some(&found)).await;
            state.selected_workspace = Some(found.clone());
            found
        };

        debug!(selected = %selected.id, "Workspace selection changed");
        let _ = self.tx.send(WorkspaceEvent::SelectionChanged {
            selected: Some(selected),
        });
        true
    }

    /// Replace the whole list and revalidate the selection against it.
    pub async fn set_workspaces(&self, workspaces: Vec<Workspace>) {
        self.edit_list(|list| {
            *list = workspaces;
            true
        })
        .await;
    }

    /// Insert a workspace, or replace the one with the same id in place.
    pub async fn upsert_workspace(&self, workspace: Workspace) {
        self.edit_list(|list| {
            match list.iter_mut().find(|w| w.id == workspace.id) {
                Some(existing) => *existing = workspace,
                None => list.push(workspace),
            }
            true
        })
        .await;
    }

    /// Remove the workspace with `id`. Returns whether it existed.
    pub async fn remove_workspace(&self, id: &str) -> bool {
        self.edit_list(|list| {
            let before = list.len();
            list.retain(|w| w.id != id);
            list.len() != before
        })
        .await
    }

    /// Forget everything, in memory and in the store.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            self.store.remove(keys::WORKSPACES).await;
            self.store.remove(keys::SELECTED_WORKSPACE_ID).await;
            *state = WorkspaceRegistryState::default();
        }
        info!("Workspaces cleared");
        let _ = self.tx.send(WorkspaceEvent::WorkspacesChanged {
            workspaces: Vec::new(),
        });
        let _ = self
            .tx
            .send(WorkspaceEvent::SelectionChanged { selected: None });
    }

    /// Apply `edit` to the list under the write lock, then persist the list,
    /// refresh the selection and notify. An edit returning `false` changed
    /// nothing and is not committed.
    async fn edit_list<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut Vec<Workspace>) -> bool,
    {
        let (workspaces, selection_changed, selected) = {
            let mut state = self.state.write().await;
            let mut list = state.workspaces.clone();
            if !edit(&mut list) {
                return false;
            }
            let workspaces = dedupe_by_id(list);

            self.store.set(keys::WORKSPACES, &workspaces).await;

            let previous = state.selected_workspace.take();
            let refreshed = previous
                .as_ref()
                .and_then(|prev| workspaces.iter().find(|w| w.id == prev.id).cloned());
            if refreshed.is_none() {
                self.store.remove(keys::SELECTED_WORKSPACE_ID).await;
            }

            let selection_changed = previous != refreshed;
            state.workspaces = workspaces.clone();
            state.selected_workspace = refreshed.clone();
            (workspaces, selection_changed, refreshed)
        };

        info!(count = workspaces.len(), "Workspaces replaced");
        let _ = self.tx.send(WorkspaceEvent::WorkspacesChanged { workspaces });
        if selection_changed {
            let _ = self.tx.send(WorkspaceEvent::SelectionChanged { selected });
        }
        true
    }

    async fn persist_selection(&self, selected: Option<&Workspace>) {
        match selected {
            Some(ws) => {
                self.store.set(keys::SELECTED_WORKSPACE_ID, &ws.id).await;
            }
            None => {
                self.store.remove(keys::SELECTED_WORKSPACE_ID).await;
            }
        }
    }
}

/// Drop later entries whose id was already seen.
fn dedupe_by_id(workspaces: Vec<Workspace>) -> Vec<Workspace> {
    let mut seen = HashSet::new();
    workspaces
        .into_iter()
        .filter(|w| {
            let fresh = seen.insert(w.id.clone());
            if !fresh {
                warn!(workspace_id = %w.id, "Dropping duplicate workspace id");
            }
            fresh
        })
        .collect()
}
