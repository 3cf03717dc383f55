//! `KeyValueMedium` trait — the raw, fallible persistence medium.
//!
//! Implementations store opaque text under string keys. They report failures
//! honestly; `SafeStore` is the layer that absorbs them.

use async_trait::async_trait;

use crate::error::StoreError;

/// Backend-agnostic string key-value medium.
#[async_trait]
pub trait KeyValueMedium: Send + Sync {
    /// Read the raw text stored under `key`, or `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write (upsert) raw text under `key`.
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Returns whether a record was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete every record in this medium's namespace.
    async fn clear(&self) -> Result<(), StoreError>;
}
