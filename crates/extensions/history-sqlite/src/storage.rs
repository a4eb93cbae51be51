//! SQLite key/value storage implementation.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::debug;

use walko_protocols::{KeyValueStorage, StorageError};

use crate::schema::init_schema;

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;

/// SQLite-backed [`KeyValueStorage`].
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database. Parent directories are created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }

        debug!("opening view storage at {}", path.display());
        let conn = Connection::open(path)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
                let keys: Vec<String> = stmt
                    .query_map([], |row| row.get(0))?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(keys)
            })
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStorage for SqliteStorage {
    fn id(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let value: Option<String> = conn
                    .query_row("SELECT value FROM kv_store WHERE key = ?1", [&key], |row| {
                        row.get(0)
                    })
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let key = key.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                    updated_at = excluded.updated_at",
                    params![key, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", [&key])?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))
    }
}
