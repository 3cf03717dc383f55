//! `SafeStore` — fault-tolerant typed access to a `KeyValueMedium`.
//!
//! Every failure mode (missing key, corrupt payload, medium error) collapses
//! into a fallback value or a `false` flag. Nothing here returns an error;
//! failures are reported through `tracing` only.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::store::traits::KeyValueMedium;

/// Outcome of decoding a persisted record.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// The record exists and decoded into `T`.
    Found(T),
    /// No record under the key, or the record is JSON `null`.
    Missing,
    /// The record exists but is not valid JSON for `T`. Left in place.
    Malformed,
    /// The medium itself failed.
    Unavailable,
}

impl<T> Loaded<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Take the decoded value, or `fallback` for every other outcome.
    pub fn unwrap_or(self, fallback: T) -> T {
        self.into_option().unwrap_or(fallback)
    }
}

/// Cloneable handle over a shared medium.
#[derive(Clone)]
pub struct SafeStore {
    medium: Arc<dyn KeyValueMedium>,
}

impl SafeStore {
    pub fn new(medium: Arc<dyn KeyValueMedium>) -> Self {
        Self { medium }
    }

    /// Decode the record under `key`, reporting which path was taken.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Loaded<T> {
        let raw = match self.medium.read(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Loaded::Missing,
            Err(e) => {
                warn!(key = %key, error = %e, "Storage read failed, using fallback");
                return Loaded::Unavailable;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Stored record is not valid JSON, using fallback");
                return Loaded::Malformed;
            }
        };

        if value.is_null() {
            return Loaded::Missing;
        }

        match serde_json::from_value(value) {
            Ok(decoded) => Loaded::Found(decoded),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored record has unexpected shape, using fallback");
                Loaded::Malformed
            }
        }
    }

    /// Read `key`, returning `fallback` on absence or any failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.load(key).await.unwrap_or(fallback)
    }

    /// Serialize `value` and write it under `key`.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize record");
                return false;
            }
        };
        match self.medium.write(key, &text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Storage write failed");
                false
            }
        }
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub async fn remove(&self, key: &str) -> bool {
        match self.medium.delete(key).await {
            Ok(removed) => {
                debug!(key = %key, removed, "Record removed");
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Storage remove failed");
                false
            }
        }
    }

    /// Remove every record in the namespace.
    pub async fn clear(&self) -> bool {
        match self.medium.clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Storage clear failed");
                false
            }
        }
    }
}
