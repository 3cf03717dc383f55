//! OnboardingMachine — drives the wizard and mirrors it into the store so a
//! reload resumes at the same step with the same field values.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use super::state::{JumpPolicy, OnboardingRecord, OnboardingState, OnboardingStep};
use crate::navigation::{Navigator, Route};
use crate::store::{Loaded, SafeStore, keys};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Wizard change notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnboardingEvent {
    StepChanged { step: OnboardingStep },
    StepDataSaved { step: OnboardingStep },
    Completed,
    Reset,
}

/// Coordinates the onboarding wizard: step transitions, captured data, and
/// persistence.
pub struct OnboardingMachine {
    store: SafeStore,
    policy: JumpPolicy,
    state: RwLock<OnboardingState>,
    tx: broadcast::Sender<OnboardingEvent>,
}

impl OnboardingMachine {
    pub fn new(store: SafeStore, policy: JumpPolicy) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            store,
            policy,
            state: RwLock::new(OnboardingState::default()),
            tx,
        })
    }

    /// Subscribe to wizard changes.
    pub fn subscribe(&self) -> broadcast::Receiver<OnboardingEvent> {
        self.tx.subscribe()
    }

    pub fn policy(&self) -> JumpPolicy {
        self.policy
    }

    /// Restore position and step data from the store.
    pub async fn hydrate(&self) {
        let restored = match self.store.load::<OnboardingRecord>(keys::ONBOARDING_STATE).await {
            Loaded::Found(record) => OnboardingState::from_record(record),
            Loaded::Missing => OnboardingState::default(),
            Loaded::Malformed | Loaded::Unavailable => {
                warn!("Onboarding progress unreadable, starting from the first step");
                OnboardingState::default()
            }
        };

        info!(
            step = %restored.current_step,
            saved_steps = restored.step_data.len(),
            completed = restored.is_completed(),
            "Onboarding hydrated"
        );
        *self.state.write().await = restored;
    }

    /// The step currently shown.
    pub async fn current_step(&self) -> OnboardingStep {
        self.state.read().await.current_step
    }

    /// Data captured for `step`, if any.
    pub async fn step_data(&self, step: OnboardingStep) -> Option<serde_json::Value> {
        self.state.read().await.step_data.get(&step).cloned()
    }

    /// Full copy of the wizard state.
    pub async fn snapshot(&self) -> OnboardingState {
        self.state.read().await.clone()
    }

    /// Advance one step, staying on the last.
    pub async fn next(&self) -> OnboardingStep {
        self.transition(|state| state.current_step.next()).await
    }

    /// Go back one step, staying on the first.
    pub async fn back(&self) -> OnboardingStep {
        self.transition(|state| state.current_step.previous()).await
    }

    /// Jump to step `n`, clamped to 1..=4.
    ///
    /// Under [`JumpPolicy::VisitedOnly`] the target is further capped at the
    /// furthest step reached. Captured data is never discarded.
    pub async fn go_to(&self, n: i64) -> OnboardingStep {
        let policy = self.policy;
        self.transition(move |state| {
            let target = OnboardingStep::clamped(n);
            match policy {
                JumpPolicy::Any => target,
                JumpPolicy::VisitedOnly => target.min(state.highest_step),
            }
        })
        .await
    }

    /// Merge `data` into the captured payload of `step` and persist.
    pub async fn save_step_data(&self, step: OnboardingStep, data: serde_json::Value) {
        {
            let mut state = self.state.write().await;
            let mut updated = state.clone();
            updated.merge_step_data(step, data);
            self.persist(&updated).await;
            *state = updated;
        }
        debug!(step = %step, "Onboarding step data saved");
        let _ = self.tx.send(OnboardingEvent::StepDataSaved { step });
    }

    /// Mark the wizard finished and send the UI to the dashboard.
    pub async fn complete(&self, navigator: &dyn Navigator) {
        {
            let mut state = self.state.write().await;
            let mut updated = state.clone();
            updated.completed_at = Some(Utc::now());
            self.persist(&updated).await;
            *state = updated;
        }
        info!("Onboarding completed");
        let _ = self.tx.send(OnboardingEvent::Completed);
        navigator.navigate(Route::Dashboard);
    }

    /// Forget all progress, in memory and in the store.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            self.store.remove(keys::ONBOARDING_STATE).await;
            *state = OnboardingState::default();
        }
        info!("Onboarding reset");
        let _ = self.tx.send(OnboardingEvent::Reset);
    }

    /// Apply a step change computed from the current state, persist, notify.
    async fn transition<F>(&self, target: F) -> OnboardingStep
    where
        F: FnOnce(&OnboardingState) -> OnboardingStep,
    {
        let (from, to) = {
            let mut state = self.state.write().await;
            let from = state.current_step;
            let to = target(&*state);
            let mut updated = state.clone();
            updated.move_to(to);
            self.persist(&updated).await;
            *state = updated;
            (from, to)
        };

        debug!(from = %from, to = %to, "Onboarding step transition");
        if from != to {
            let _ = self.tx.send(OnboardingEvent::StepChanged { step: to });
        }
        to
    }

    async fn persist(&self, state: &OnboardingState) {
        if !self.store.set(keys::ONBOARDING_STATE, &state.to_record()).await {
            warn!(step = %state.current_step, "Onboarding progress not persisted");
        }
    }
}
