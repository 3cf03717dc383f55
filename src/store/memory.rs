//! In-process medium — used in tests and when no database is configured.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::traits::KeyValueMedium;

/// `HashMap`-backed medium.
///
/// Can be switched into an unavailable mode where every call fails, which
/// mimics a disabled or quota-exhausted store.
#[derive(Default)]
pub struct MemoryMedium {
    records: RwLock<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory medium disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueMedium for MemoryMedium {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.records
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.records.write().await.remove(key).is_some())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check()?;
        self.records.write().await.clear();
        Ok(())
    }
}
