// crates/sentinel-store-sqlite/src/schema.rs
// ============================================================================
// Module: SQLite Schema
// Description: DDL and additive migration runner for the pipeline's tables.
// Purpose: Keep the on-disk shape of raw_items/events/alerts/facilities/
//          lanes/shipments (and their required indexes) in one place.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! `raw_items`, `events`, and `alerts` each store their full record as a
//! canonical-JSON blob in a `data` column, alongside the indexed columns §6
//! names as query predicates; `facilities`/`lanes`/`shipments` are read-only,
//! CSV-bootstrapped tables and so use direct typed columns instead. Migrations
//! are additive only: new columns get `NULL`-able defaults, existing columns
//! are never renamed or dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::errors::SqliteStoreError;

/// Current schema version. Bump when adding a migration branch below.
const SCHEMA_VERSION: i64 = 1;

const CREATE_V1: &str = "
CREATE TABLE IF NOT EXISTS raw_items (
    raw_id TEXT PRIMARY KEY,
    source_id TEXT NOT NULL,
    tier TEXT NOT NULL,
    fetched_at INTEGER NOT NULL,
    canonical_id TEXT,
    content_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    data BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_raw_items_source_id ON raw_items (source_id);
CREATE INDEX IF NOT EXISTS idx_raw_items_canonical_id ON raw_items (canonical_id);
CREATE INDEX IF NOT EXISTS idx_raw_items_content_hash ON raw_items (content_hash);
CREATE INDEX IF NOT EXISTS idx_raw_items_status ON raw_items (status);
CREATE UNIQUE INDEX IF NOT EXISTS uq_raw_items_source_canonical
    ON raw_items (source_id, canonical_id) WHERE canonical_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS uq_raw_items_source_hash
    ON raw_items (source_id, content_hash) WHERE canonical_id IS NULL;

CREATE TABLE IF NOT EXISTS events (
    event_id TEXT PRIMARY KEY,
    source_id TEXT NOT NULL,
    raw_id TEXT NOT NULL,
    data BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_raw_id ON events (raw_id);

CREATE TABLE IF NOT EXISTS alerts (
    alert_id TEXT PRIMARY KEY,
    correlation_key TEXT NOT NULL,
    last_seen_utc INTEGER NOT NULL,
    data BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alerts_correlation_key ON alerts (correlation_key);
CREATE INDEX IF NOT EXISTS idx_alerts_last_seen_utc ON alerts (last_seen_utc);

CREATE TABLE IF NOT EXISTS facilities (
    facility_id TEXT PRIMARY KEY,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    country TEXT,
    criticality INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_facilities_city_state ON facilities (city, state);

CREATE TABLE IF NOT EXISTS lanes (
    lane_id TEXT PRIMARY KEY,
    origin_facility_id TEXT NOT NULL,
    destination_facility_id TEXT NOT NULL,
    volume INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_lanes_origin ON lanes (origin_facility_id);
CREATE INDEX IF NOT EXISTS idx_lanes_destination ON lanes (destination_facility_id);

CREATE TABLE IF NOT EXISTS shipments (
    shipment_id TEXT PRIMARY KEY,
    lane_id TEXT NOT NULL,
    ship_date INTEGER,
    eta_date INTEGER,
    status TEXT NOT NULL,
    priority_flag INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_shipments_lane_id ON shipments (lane_id);
";

/// Initializes the schema on first open, or validates the stored version on
/// subsequent opens.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Invalid`] when the database carries a schema
/// version newer than this crate understands.
pub fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS schema_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> =
        tx.query_row("SELECT version FROM schema_meta LIMIT 1", params![], |row| row.get(0)).optional()?;
    match version {
        None => {
            tx.execute_batch(CREATE_V1)?;
            tx.execute("INSERT INTO schema_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) if value < SCHEMA_VERSION => {
            return Err(SqliteStoreError::Invalid(format!(
                "no migration path registered from schema version {value} to {SCHEMA_VERSION}"
            )));
        }
        Some(value) => {
            return Err(SqliteStoreError::Invalid(format!("database schema version {value} is newer than this build supports")));
        }
    }
    tx.commit()?;
    Ok(())
}
