// crates/sentinel-store-sqlite/src/lib.rs
// ============================================================================
// Module: Sentinel SQLite Store Library
// Description: rusqlite-backed persistence for raw_items/events/alerts and
//              the read-only facilities/lanes/shipments inventory (A2/A3).
// Purpose: One durable backend satisfying every sentinel-core storage seam.
// Dependencies: rusqlite, sentinel-core
// ============================================================================

//! ## Overview
//! [`SqliteStore`] is the one durable backend this workspace ships: it wraps
//! a single mutex-guarded [`rusqlite::Connection`] and implements every
//! storage trait `sentinel-core` defines ([`sentinel_core::RawItemStore`],
//! [`sentinel_core::EventStore`], [`sentinel_core::AlertStore`],
//! [`sentinel_core::core::inventory::Inventory`]). A companion
//! [`artifact_sink::FsArtifactSink`] implements [`sentinel_core::ArtifactSink`]
//! by writing canonical-JSON files to a configured directory. The network
//! inventory tables are bootstrapped once from CSV fixtures (§1: an external
//! collaborator's concern) via [`inventory::load_facilities_csv`],
//! [`inventory::load_lanes_csv`], and [`inventory::load_shipments_csv`); the
//! core pipeline only ever reads them through the `Inventory` trait.

#![warn(missing_docs)]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod alert_store;
pub mod artifact_sink;
pub mod connection;
pub mod errors;
pub mod event_store;
pub mod inventory;
pub mod raw_item_store;
pub mod schema;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use rusqlite::Connection;

use crate::connection::open_connection;
pub use crate::artifact_sink::FsArtifactSink;
pub use crate::connection::SqliteJournalMode;
pub use crate::connection::SqliteStoreConfig;
pub use crate::errors::SqliteStoreError;
pub use crate::inventory::load_facilities_csv;
pub use crate::inventory::load_lanes_csv;
pub use crate::inventory::load_shipments_csv;

// ============================================================================
// SECTION: Store
// ============================================================================

/// SQLite-backed implementation of every `sentinel-core` storage seam.
///
/// A single [`Connection`] is shared behind a [`Mutex`] per §5's single
/// logical worker model: the orchestrator never needs concurrent writers,
/// and `SQLite`'s own locking would serialize them anyway.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if absent) a `SQLite`-backed store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the file cannot be opened or the
    /// schema cannot be initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let connection = open_connection(&config)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}
