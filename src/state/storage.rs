use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StorageError;

/// A string key-value store
///
/// Implementations must be callable from blocking worker threads, so
/// every method takes `&self` and the trait requires `Send + Sync`.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed key-value store.
///
/// The database file lives in the user's data directory by default:
/// - Linux: ~/.local/share/roster/roster.db
/// - macOS: ~/Library/Application Support/roster/roster.db
/// - Windows: %APPDATA%\roster\roster.db
///
/// rusqlite::Connection is not Sync, so each operation opens its own
/// connection to the file instead of sharing one.
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create the data directory and schema if needed
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let storage = SqliteStorage { db_path };
        storage.init_schema()?;

        debug!(path = %storage.db_path.display(), "key-value schema ready");
        Ok(storage)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key         TEXT PRIMARY KEY,
                value       TEXT NOT NULL,
                updated_at  INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, Utc::now().timestamp()],
        )?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        debug!(key, removed, "removed value");
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// In-memory fake used by tests to observe writes
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
    failing: std::sync::atomic::AtomicBool,
    writes: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of successful `set` and `remove` calls
    pub fn writes(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StorageError::Backend("disk full".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open(dir.path().join("nested").join("roster.db")).unwrap();

        assert_eq!(storage.get("favorites").unwrap(), None);

        storage.set("favorites", "[]").unwrap();
        storage.set("favorites", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(
            storage.get("favorites").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );

        storage.remove("favorites").unwrap();
        assert_eq!(storage.get("favorites").unwrap(), None);

        // Removing again is fine
        storage.remove("favorites").unwrap();
    }

    #[test]
    fn test_sqlite_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.db");

        SqliteStorage::open(&path).unwrap().set("k", "v").unwrap();
        let reopened = SqliteStorage::open(&path).unwrap();

        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_memory_storage_failing_mode() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();

        storage.set_failing(true);

        assert!(storage.get("k").is_err());
        assert!(storage.set("k", "w").is_err());
        assert_eq!(storage.writes(), 1);
    }
}
