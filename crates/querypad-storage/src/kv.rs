//! On-device key-value storage.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access,
//! exposing synchronous get/set/remove by string key. This is the device
//! collaborator the local adapter round-trips whole collections through.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use querypad_core::error::QuerypadError;

/// Thread-safe string key/value store backed by SQLite.
///
/// Uses WAL mode for concurrent read safety. The connection is wrapped in a
/// Mutex since rusqlite Connection is not Sync.
pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> Result<Self, QuerypadError> {
        // Ensure parent directory exists.
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| QuerypadError::Storage(format!("Failed to open store: {}", e)))?;

        let store = Self::init(conn)?;
        info!("Key-value store opened at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, QuerypadError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| QuerypadError::Storage(format!("Failed to open in-memory store: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, QuerypadError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             CREATE TABLE IF NOT EXISTS kv (
                 key   TEXT PRIMARY KEY,
                 value TEXT NOT NULL
             );",
        )
        .map_err(|e| QuerypadError::Storage(format!("Failed to initialize store: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<String>, QuerypadError> {
        let conn = self.lock()?;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| QuerypadError::Storage(format!("Failed to read key '{}': {}", key, e)))
    }

    /// Write `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), QuerypadError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )
        .map_err(|e| QuerypadError::Storage(format!("Failed to write key '{}': {}", key, e)))?;
        Ok(())
    }

    /// Remove `key` and its value. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), QuerypadError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])
            .map_err(|e| QuerypadError::Storage(format!("Failed to remove key '{}': {}", key, e)))?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, QuerypadError> {
        self.conn
            .lock()
            .map_err(|e| QuerypadError::Storage(format!("Store lock poisoned: {}", e)))
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = KvStore::in_memory().unwrap();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let store = KvStore::in_memory().unwrap();
        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_set_overwrites() {
        let store = KvStore::in_memory().unwrap();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_remove() {
        let store = KvStore::in_memory().unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        // Removing again is fine.
        store.remove("k").unwrap();
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.db");

        {
            let store = KvStore::open(&path).unwrap();
            store.set("k", "v").unwrap();
        }

        let reopened = KvStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }
}
