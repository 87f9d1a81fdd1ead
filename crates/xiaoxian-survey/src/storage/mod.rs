//! Storage layer for xiaoxian-survey.
//!
//! A small `SQLite`-backed key-value store. Each slot holds one complete JSON
//! document and every write replaces the document whole; there are no partial
//! updates.

pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Key-value slot storage.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// A stored slot value with its last write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// The stored document.
    pub value: String,
    /// When the slot was last written.
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    /// Open or create a database at the given path.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or its schema is
    /// unsupported.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::initialize(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        schema::initialize(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn read_slot(&self, key: &str) -> Result<Option<Slot>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT value, updated_at FROM slots WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.map(|(value, updated_at)| Slot {
            value,
            updated_at: parse_time(&updated_at),
        }))
    }

    /// Replace the whole value of a slot, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote {} bytes to slot {}", value.len(), key);
        Ok(())
    }

    /// All slot keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn slot_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM slots ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (slot_count, value_bytes, newest): (i64, i64, Option<String>) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(CAST(value AS BLOB))), 0), MAX(updated_at) FROM slots",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let db_size_bytes = if self.path == Path::new(":memory:") {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            slot_count: usize::try_from(slot_count).unwrap_or(0),
            value_bytes: u64::try_from(value_bytes).unwrap_or(0),
            last_write: newest.as_deref().map(parse_time),
            db_size_bytes,
        })
    }
}

fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of slots.
    pub slot_count: usize,
    /// Total size of all slot values in bytes.
    pub value_bytes: u64,
    /// Most recent slot write.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_read_missing_slot() {
        let storage = create_test_storage();
        assert!(storage.read_slot("absent").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let storage = create_test_storage();
        storage.write_slot("k", "[1,2,3]").unwrap();
        let slot = storage.read_slot("k").unwrap().unwrap();
        assert_eq!(slot.value, "[1,2,3]");
    }

    #[test]
    fn test_write_overwrites_whole_value() {
        let storage = create_test_storage();
        storage.write_slot("k", "[1,2,3]").unwrap();
        storage.write_slot("k", "[]").unwrap();
        assert_eq!(storage.read_slot("k").unwrap().unwrap().value, "[]");
        assert_eq!(storage.slot_keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_slots_are_independent() {
        let storage = create_test_storage();
        storage.write_slot("b", "2").unwrap();
        storage.write_slot("a", "1").unwrap();
        assert_eq!(storage.slot_keys().unwrap(), vec!["a", "b"]);
        assert_eq!(storage.read_slot("b").unwrap().unwrap().value, "2");
    }

    #[test]
    fn test_unicode_value() {
        let storage = create_test_storage();
        storage.write_slot("k", r#"["剧情反转很精彩"]"#).unwrap();
        assert_eq!(
            storage.read_slot("k").unwrap().unwrap().value,
            r#"["剧情反转很精彩"]"#
        );
    }

    #[test]
    fn test_stats_empty() {
        let stats = create_test_storage().stats().unwrap();
        assert_eq!(stats.slot_count, 0);
        assert_eq!(stats.value_bytes, 0);
        assert!(stats.last_write.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_counts_bytes() {
        let storage = create_test_storage();
        storage.write_slot("a", "[]").unwrap();
        storage.write_slot("b", "满意").unwrap();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.slot_count, 2);
        // "满意" is six bytes of UTF-8
        assert_eq!(stats.value_bytes, 8);
        assert!(stats.last_write.is_some());
    }

    #[test]
    fn test_path() {
        assert_eq!(create_test_storage().path(), Path::new(":memory:"));
    }

    #[test]
    fn test_open_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested/deeper/survey.db");

        let storage = Storage::open(&db_path).unwrap();
        storage.write_slot("k", "[]").unwrap();
        assert!(db_path.exists());
        assert_eq!(storage.path(), db_path);
        assert!(storage.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("survey.db");

        Storage::open(&db_path)
            .unwrap()
            .write_slot("k", "[42]")
            .unwrap();

        let reopened = Storage::open(&db_path).unwrap();
        assert_eq!(reopened.read_slot("k").unwrap().unwrap().value, "[42]");
    }
}
