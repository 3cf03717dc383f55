//! SessionStore — the signed-in team member, persisted under `team_session`.
//!
//! Reads go straight to the store; sessions are read at page load, not in hot
//! paths, so there is no in-memory cache to keep coherent.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::model::{TeamMember, TeamSession};
use crate::navigation::{Navigator, Route};
use crate::store::{SafeStore, keys};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Session change notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { session: TeamSession },
    SignedOut,
}

/// Shared session container.
pub struct SessionStore {
    store: SafeStore,
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(store: SafeStore) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self { store, tx })
    }

    /// Subscribe to sign-in/sign-out events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Start a session for `member` and send the UI to the team portal.
    pub async fn sign_in(&self, member: &TeamMember, navigator: &dyn Navigator) -> TeamSession {
        let session = TeamSession::for_member(member);
        if !self.store.set(keys::TEAM_SESSION, &session).await {
            warn!(member_id = %member.id, "Session not persisted, it will not survive a reload");
        }
        info!(member_id = %session.id, role = %session.role, "Team member signed in");

        let _ = self.tx.send(SessionEvent::SignedIn {
            session: session.clone(),
        });
        navigator.navigate(Route::TeamPortal);
        session
    }

    /// The persisted session, or `None` if absent or unreadable.
    pub async fn current_session(&self) -> Option<TeamSession> {
        self.store.get(keys::TEAM_SESSION, None).await
    }

    /// End the session and send the UI back to the sign-in screen.
    pub async fn sign_out(&self, navigator: &dyn Navigator) {
        self.store.remove(keys::TEAM_SESSION).await;
        info!("Team member signed out");
        let _ = self.tx.send(SessionEvent::SignedOut);
        navigator.navigate(Route::TeamLogin);
    }

    /// Drop the session record without requesting navigation.
    pub async fn clear(&self) {
        self.store.remove(keys::TEAM_SESSION).await;
        debug!("Team session cleared");
        let _ = self.tx.send(SessionEvent::SignedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RecordingNavigator;
    use crate::session::model::Role;
    use crate::store::{KeyValueMedium, MemoryMedium};

    fn member() -> TeamMember {
        TeamMember {
            id: "m1".into(),
            name: "Maria Lopez".into(),
            email: "maria@studio.example".into(),
            role: Role::Manager,
        }
    }

    fn session_store() -> (Arc<SessionStore>, SafeStore, Arc<MemoryMedium>) {
        let medium = Arc::new(MemoryMedium::new());
        let store = SafeStore::new(medium.clone());
        (SessionStore::new(store.clone()), store, medium)
    }

    #[tokio::test]
    async fn sign_in_persists_and_navigates() {
        let (sessions, store, _) = session_store();
        let nav = RecordingNavigator::new();

        let session = sessions.sign_in(&member(), &nav).await;
        assert_eq!(session.role, Role::Manager);
        assert_eq!(nav.last(), Some(Route::TeamPortal));

        // A fresh container over the same store sees the session
        let reloaded = SessionStore::new(store);
        assert_eq!(reloaded.current_session().await, Some(session));
    }

    #[tokio::test]
    async fn sign_out_removes_session() {
        let (sessions, _, _) = session_store();
        let nav = RecordingNavigator::new();
        sessions.sign_in(&member(), &nav).await;

        sessions.sign_out(&nav).await;
        assert!(sessions.current_session().await.is_none());
        assert_eq!(nav.routes(), vec![Route::TeamPortal, Route::TeamLogin]);
    }

    #[tokio::test]
    async fn no_session_by_default() {
        let (sessions, _, _) = session_store();
        assert!(sessions.current_session().await.is_none());
    }

    #[tokio::test]
    async fn partial_record_still_yields_session() {
        let (sessions, _, medium) = session_store();
        medium
            .write(keys::TEAM_SESSION, r#"{"id":"m1","role":"Staff"}"#)
            .await
            .unwrap();

        let session = sessions.current_session().await.unwrap();
        assert_eq!(session.id, "m1");
        assert_eq!(session.name, "");
        assert_eq!(session.role, Role::Staff);
    }

    #[tokio::test]
    async fn corrupt_record_is_treated_as_absent() {
        let (sessions, _, medium) = session_store();
        medium.write(keys::TEAM_SESSION, "{{{").await.unwrap();
        assert!(sessions.current_session().await.is_none());

        medium.write(keys::TEAM_SESSION, r#"{"role":"Staff"}"#).await.unwrap();
        assert!(sessions.current_session().await.is_none());
    }

    #[tokio::test]
    async fn sign_in_with_unavailable_medium_still_navigates() {
        let (sessions, _, medium) = session_store();
        medium.set_unavailable(true);
        let nav = RecordingNavigator::new();

        let session = sessions.sign_in(&member(), &nav).await;
        assert_eq!(session.id, "m1");
        assert_eq!(nav.last(), Some(Route::TeamPortal));
        assert!(sessions.current_session().await.is_none());
    }

    #[tokio::test]
    async fn broadcasts_sign_in_and_out() {
        let (sessions, _, _) = session_store();
        let mut rx = sessions.subscribe();
        let nav = RecordingNavigator::new();

        sessions.sign_in(&member(), &nav).await;
        match rx.recv().await.unwrap() {
            SessionEvent::SignedIn { session } => assert_eq!(session.id, "m1"),
            other => panic!("Expected SignedIn, got {other:?}"),
        }

        sessions.sign_out(&nav).await;
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn clear_removes_session_without_navigation() {
        let (sessions, _, _) = session_store();
        let nav = RecordingNavigator::new();
        sessions.sign_in(&member(), &nav).await;
        let mut rx = sessions.subscribe();

        sessions.clear().await;
        assert!(sessions.current_session().await.is_none());
        assert_eq!(nav.routes(), vec![Route::TeamPortal]);
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut);
    }
}
