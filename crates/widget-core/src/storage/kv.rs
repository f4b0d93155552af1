//! Key-value storage backends

use std::collections::HashMap;

use rusqlite::{Connection, params};
use tracing::error;

use crate::error::Result;

/// String key-value store the persistence adapter writes through
pub trait KvStore: Send {
    /// Read a value; absent keys yield `None`
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral embedding
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed key-value store
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Create a store backed by the given database path
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS widget_kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Option<String> {
        let result = self.conn.query_row(
            "SELECT value FROM widget_kv WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                error!("Failed to read key {}: {}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO widget_kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_kv_roundtrip() {
        let mut kv = MemoryKv::new();
        assert_eq!(kv.get("missing"), None);

        kv.set("k", "v1").unwrap();
        kv.set("k", "v2").unwrap();
        assert_eq!(kv.get("k"), Some("v2".to_string()));
    }

    #[test]
    fn test_sqlite_kv_roundtrip() {
        let mut kv = SqliteKv::in_memory().unwrap();
        assert_eq!(kv.get("missing"), None);

        kv.set("k", "v1").unwrap();
        kv.set("k", "v2").unwrap();
        assert_eq!(kv.get("k"), Some("v2".to_string()));
    }

    #[test]
    fn test_sqlite_kv_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");
        let path = path.to_str().unwrap();

        {
            let mut kv = SqliteKv::new(path).unwrap();
            kv.set("k", "persisted").unwrap();
        }

        let kv = SqliteKv::new(path).unwrap();
        assert_eq!(kv.get("k"), Some("persisted".to_string()));
    }
}
