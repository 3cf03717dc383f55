//! libSQL medium — durable `KeyValueMedium` implementation.
//!
//! Records live in one `kv_records` table partitioned by namespace, so several
//! profiles can share a database file without seeing each other's keys.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::schema;
use crate::store::traits::KeyValueMedium;

/// libSQL-backed medium scoped to a single namespace.
pub struct LibSqlMedium {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    namespace: String,
}

impl LibSqlMedium {
    /// Open (or create) a local database file and ensure the schema.
    pub async fn new_local(path: &Path, namespace: &str) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let medium = Self::from_database(db, namespace).await?;
        info!(path = %path.display(), namespace = %namespace, "State database opened");
        Ok(medium)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory(namespace: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;
        Self::from_database(db, namespace).await
    }

    async fn from_database(db: LibSqlDatabase, namespace: &str) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;
        schema::ensure_schema(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
            namespace: namespace.to_string(),
        })
    }

    /// Namespace this medium reads and writes.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl KeyValueMedium for LibSqlMedium {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT value FROM kv_records WHERE namespace = ?1 AND key = ?2",
                params![self.namespace.as_str(), key],
            )
            .await
            .map_err(|e| StoreError::Query(format!("read: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("read: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("read: {e}"))),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO kv_records (namespace, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (namespace, key) DO UPDATE SET value = ?3, updated_at = ?4",
                params![self.namespace.as_str(), key, value, now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("write: {e}")))?;
        debug!(key = %key, bytes = value.len(), "Record written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM kv_records WHERE namespace = ?1 AND key = ?2",
                params![self.namespace.as_str(), key],
            )
            .await
            .map_err(|e| StoreError::Query(format!("delete: {e}")))?;
        Ok(count > 0)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM kv_records WHERE namespace = ?1",
                params![self.namespace.as_str()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("clear: {e}")))?;
        info!(namespace = %self.namespace, removed = count, "Namespace cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_medium(namespace: &str) -> LibSqlMedium {
        LibSqlMedium::new_memory(namespace).await.unwrap()
    }

    #[tokio::test]
    async fn records_crud() {
        let medium = test_medium("default").await;

        assert!(medium.read("workspaces").await.unwrap().is_none());

        medium.write("workspaces", "[]").await.unwrap();
        assert_eq!(medium.read("workspaces").await.unwrap().as_deref(), Some("[]"));

        // Upsert
        medium.write("workspaces", "[{\"id\":\"w1\"}]").await.unwrap();
        assert_eq!(
            medium.read("workspaces").await.unwrap().as_deref(),
            Some("[{\"id\":\"w1\"}]")
        );

        assert!(medium.delete("workspaces").await.unwrap());
        assert!(medium.read("workspaces").await.unwrap().is_none());
        assert!(!medium.delete("workspaces").await.unwrap());
    }

    #[tokio::test]
    async fn clear_removes_every_key() {
        let medium = test_medium("default").await;
        medium.write("a", "1").await.unwrap();
        medium.write("b", "2").await.unwrap();

        medium.clear().await.unwrap();

        assert!(medium.read("a").await.unwrap().is_none());
        assert!(medium.read("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn namespaces_are_isolated_in_one_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("state.db");

        let salon = LibSqlMedium::new_local(&path, "salon").await.unwrap();
        salon.write("team_session", "\"salon\"").await.unwrap();
        drop(salon);

        let clinic = LibSqlMedium::new_local(&path, "clinic").await.unwrap();
        assert!(clinic.read("team_session").await.unwrap().is_none());
        clinic.write("team_session", "\"clinic\"").await.unwrap();
        clinic.clear().await.unwrap();
        drop(clinic);

        let salon = LibSqlMedium::new_local(&path, "salon").await.unwrap();
        assert_eq!(
            salon.read("team_session").await.unwrap().as_deref(),
            Some("\"salon\"")
        );
        assert_eq!(salon.namespace(), "salon");
    }
}
