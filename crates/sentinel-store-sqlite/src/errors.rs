// crates/sentinel-store-sqlite/src/errors.rs
// ============================================================================
// Module: SQLite Store Errors
// Description: Internal error type for the SQLite-backed store, mapped onto
//              the backend-agnostic `sentinel_core::errors::StoreError`.
// Purpose: Keep SQLite/IO/serialization failure detail close to the call
//          site while still satisfying the trait seams' `StoreError` return.
// Dependencies: thiserror, sentinel-core
// ============================================================================

use sentinel_core::errors::StoreError;
use thiserror::Error;

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw row payloads.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error (opening the database file, filesystem artifact writes).
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A stored row failed to deserialize from its canonical JSON blob.
    #[error("sqlite store corrupt row: {0}")]
    Corrupt(String),
    /// Invalid input rejected before it reached the database.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Db(message) => Self::Backend(message),
            SqliteStoreError::Corrupt(message) => Self::Backend(format!("corrupt row: {message}")),
            SqliteStoreError::Invalid(message) => Self::Backend(format!("invalid data: {message}")),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

impl From<serde_json::Error> for SqliteStoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Corrupt(error.to_string())
    }
}
