// crates/sentinel-store-sqlite/src/connection.rs
// ============================================================================
// Module: SQLite Connection Setup
// Description: Opens a pragma-hardened connection and applies the schema.
// Purpose: Keep durability settings and schema bootstrapping in one place,
//          shared by every trait implementation in this crate.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Every store in this crate opens its connection through [`open_connection`],
//! which applies WAL journaling, a busy timeout, and foreign-key enforcement
//! before handing control to [`crate::schema::initialize_schema`]. Schema
//! migrations are additive only: new columns get `NULL`-able defaults, and
//! existing columns are never renamed or dropped (§6).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use serde::Deserialize;

use crate::errors::SqliteStoreError;
use crate::schema::initialize_schema;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended; allows concurrent readers).
    #[default]
    Wal,
    /// Delete journal mode (legacy, single-writer).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for the `SQLite`-backed store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
}

impl SqliteStoreConfig {
    /// Builds a config pointing at `path` with default pragmas.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteJournalMode::default(),
        }
    }
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

// ============================================================================
// SECTION: Open
// ============================================================================

/// Opens an `SQLite` connection with durability pragmas and an up-to-date schema.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the file cannot be opened, a pragma
/// fails to apply, or schema initialization fails.
pub fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags =
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let mut connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    initialize_schema(&mut connection)?;
    Ok(connection)
}

/// Applies durability pragmas to an open connection.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_and_reopens_without_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SqliteStoreConfig::new(dir.path().join("sentinel.db"));
        drop(open_connection(&config).expect("first open"));
        drop(open_connection(&config).expect("second open sees existing schema"));
    }
}
