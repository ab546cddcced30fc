//! Storage error types

/// Errors raised by storage backends.
///
/// Payloads that fail to parse on read are never reported through this type;
/// they are treated as missing entries instead.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// SQLite backend failure.
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),

    /// A value could not be serialized for writing.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
