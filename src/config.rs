//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::onboarding::JumpPolicy;

/// Default location of the local state database.
pub const DEFAULT_DB_PATH: &str = "./data/booking-console.db";

/// Console configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the libSQL database file, or `:memory:`.
    pub db_path: String,
    /// Profile namespace that partitions persisted records.
    pub namespace: String,
    /// Port for the REST/WebSocket surface.
    pub http_port: u16,
    /// Which steps the onboarding progress indicator may jump to.
    pub jump_policy: JumpPolicy,
    /// Optional JSON file with the team member directory.
    pub members_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            namespace: "default".to_string(),
            http_port: 8080,
            jump_policy: JumpPolicy::Any,
            members_path: None,
        }
    }
}

impl AppConfig {
    /// Build configuration from `BOOKING_*` environment variables.
    ///
    /// Unset variables keep their defaults; set-but-invalid values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("BOOKING_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = path;
        }

        if let Some(ns) = lookup("BOOKING_NAMESPACE") {
            let ns = ns.trim();
            if ns.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "BOOKING_NAMESPACE".to_string(),
                    message: "namespace must not be empty".to_string(),
                });
            }
            config.namespace = ns.to_string();
        }

        if let Some(port) = lookup("BOOKING_HTTP_PORT") {
            config.http_port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "BOOKING_HTTP_PORT".to_string(),
                message: format!("{e}"),
            })?;
        }

        if let Some(policy) = lookup("BOOKING_ONBOARDING_JUMP") {
            config.jump_policy =
                policy
                    .parse()
                    .map_err(|message: String| ConfigError::InvalidValue {
                        key: "BOOKING_ONBOARDING_JUMP".to_string(),
                        message,
                    })?;
        }

        config.members_path = lookup("BOOKING_MEMBERS_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}
