//! Error types for the booking console.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures of the raw key-value medium.
///
/// These never escape `SafeStore`; they are logged and turned into fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage medium unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to open storage: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Schema setup failed: {0}")]
    Schema(String),
}

/// Member directory loading errors.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Failed to read member list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid member list {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for the console.
pub type Result<T> = std::result::Result<T, Error>;
