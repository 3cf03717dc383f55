//! Onboarding wizard — the four-step flow a new business completes before
//! reaching the dashboard.
//!
//! The wizard position and each step's captured form fields are persisted on
//! every change, so a reload resumes mid-flow.

pub mod machine;
pub mod routes;
pub mod state;

pub use machine::{OnboardingEvent, OnboardingMachine};
pub use state::{JumpPolicy, OnboardingRecord, OnboardingState, OnboardingStep, StepSummary};
