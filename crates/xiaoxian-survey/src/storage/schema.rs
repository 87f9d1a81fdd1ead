//! `SQLite` schema for the key-value slot store.
//!
//! The store has one data table, `slots`, mapping a key to a JSON document,
//! and a `metadata` table carrying the schema version.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

/// The schema version this build reads and writes.
pub const SCHEMA_VERSION: i32 = 1;

const VERSION_KEY: &str = "schema_version";

/// Key-value slots. `value` is always a complete JSON document.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Store-level metadata.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_SLOTS_TABLE, CREATE_METADATA_TABLE];

/// Create the tables if needed and check the stored schema version.
///
/// A fresh database is stamped with [`SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the database was written by a newer
/// schema or carries an unreadable version.
pub fn initialize(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    match stored_version(conn)? {
        None => {
            conn.execute(
                "INSERT INTO metadata (key, value) VALUES (?1, ?2)",
                (VERSION_KEY, SCHEMA_VERSION.to_string()),
            )?;
            Ok(())
        }
        Some(version) if version <= SCHEMA_VERSION => Ok(()),
        Some(version) => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
            ),
        }),
    }
}

/// Read the schema version, or `None` for a database never stamped.
///
/// # Errors
///
/// Fails if the query fails or the stored value is not an integer.
pub fn stored_version(conn: &Connection) -> Result<Option<i32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|v| {
            v.parse().map_err(|_| Error::DatabaseMigration {
                message: format!("invalid schema version: {v}"),
            })
        })
        .transpose()
}
