//! SQLite-backed persistent storage.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_sqlite::rusqlite::OptionalExtension;
use async_trait::async_trait;
use chrono::Utc;

use super::StorageBackend;
use crate::error::StorageError;

/// A persistent storage backed by SQLite.
///
/// Data survives process restarts. Uses WAL journal mode for better
/// concurrent read performance.
///
/// # Example
///
/// ```ignore
/// use emoji_lib::storage::SqliteStorage;
///
/// // File-based storage
/// let storage = SqliteStorage::open("emoji-cache.db").await?;
///
/// // In-memory storage (for testing)
/// let storage = SqliteStorage::open_in_memory().await?;
/// ```
pub struct SqliteStorage {
    client: Client,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage").finish_non_exhaustive()
    }
}

impl SqliteStorage {
    /// Opens a SQLite storage at the specified path.
    ///
    /// Creates the database file and table if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory SQLite storage.
    ///
    /// Useful for testing. Data is lost when the storage is dropped.
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), async_sqlite::Error> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS storage (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL,
                        updated_at INTEGER NOT NULL
                    )",
                    [],
                )?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        let value = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM storage WHERE key = ?",
                    [key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        let key = key.to_string();
        let updated_at = Utc::now().timestamp();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO storage (key, value, updated_at) VALUES (?, ?, ?)",
                    rusqlite::params![key, value, updated_at],
                )
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| conn.execute("DELETE FROM storage WHERE key = ?", [key]))
            .await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));

        let keys = self
            .client
            .conn(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT key FROM storage WHERE key LIKE ? ESCAPE '\\' ORDER BY key")?;
                let rows = stmt.query_map([pattern], |row| row.get::<_, String>(0))?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;
        Ok(keys)
    }
}
