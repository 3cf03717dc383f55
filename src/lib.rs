//! Booking Console — persistent client state for the booking dashboard.

pub mod app;
pub mod config;
pub mod error;
pub mod navigation;
pub mod onboarding;
pub mod server;
pub mod session;
pub mod store;
pub mod workspaces;
