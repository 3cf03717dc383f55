//! Schema for the libSQL medium.
//!
//! The medium needs one table. Its version lives in SQLite's `user_version`
//! pragma, so opening an up-to-date file is a single read.

use libsql::Connection;
use tracing::info;

use crate::error::StoreError;

/// Version written to `user_version` once the schema below is applied.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_records (
        namespace TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (namespace, key)
    );
    CREATE INDEX IF NOT EXISTS idx_kv_records_updated
        ON kv_records(namespace, updated_at);
"#;

/// Create the record table unless the file already carries it.
pub async fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    let version = schema_version(conn).await?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(&format!(
        "BEGIN;{SCHEMA}PRAGMA user_version = {SCHEMA_VERSION};COMMIT;"
    ))
    .await
    .map_err(|e| StoreError::Schema(format!("schema v{SCHEMA_VERSION}: {e}")))?;
    info!(from = version, to = SCHEMA_VERSION, "State schema applied");
    Ok(())
}

/// The `user_version` recorded in the database file, 0 when fresh.
pub async fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    let mut rows = conn
        .query("PRAGMA user_version", ())
        .await
        .map_err(|e| StoreError::Schema(format!("reading user_version: {e}")))?;
    match rows.next().await {
        Ok(Some(row)) => row
            .get::<i64>(0)
            .map_err(|e| StoreError::Schema(format!("reading user_version: {e}"))),
        Ok(None) => Ok(0),
        Err(e) => Err(StoreError::Schema(format!("reading user_version: {e}"))),
    }
}
