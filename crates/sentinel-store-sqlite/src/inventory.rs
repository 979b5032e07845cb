// crates/sentinel-store-sqlite/src/inventory.rs
// ============================================================================
// Module: SQLite Network Inventory
// Description: CSV bootstrap loader (A3) and the read-only Inventory seam.
// Purpose: Populate facilities/lanes/shipments once from CSV fixtures, then
//          serve C4/C5 queries against the loaded tables.
// Dependencies: csv, rusqlite, sentinel-core
// ============================================================================

//! ## Overview
//! Facilities, lanes, and shipments are external-collaborator data (§1): the
//! pipeline itself never writes these tables, it only reads them through
//! [`sentinel_core::core::inventory::Inventory`]. [`load_facilities_csv`],
//! [`load_lanes_csv`], and [`load_shipments_csv`] are the one-time ambient
//! bootstrap (A3) that turns a CSV export of that external network data into
//! query-ready rows. Re-running a loader against the same file is idempotent:
//! rows are upserted by primary key.
//!
//! Expected CSV headers:
//! - facilities: `facility_id,city,state,country,criticality`
//! - lanes: `lane_id,origin_facility_id,destination_facility_id,volume`
//! - shipments: `shipment_id,lane_id,ship_date,eta_date,status,priority_flag`
//!   (`ship_date`/`eta_date` are RFC 3339 or empty; `priority_flag` is
//!   `true`/`false` or `1`/`0`)

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use rusqlite::OptionalExtension;
use rusqlite::params;
use sentinel_core::core::identifiers::FacilityId;
use sentinel_core::core::identifiers::LaneId;
use sentinel_core::core::identifiers::ShipmentId;
use sentinel_core::core::inventory::Facility;
use sentinel_core::core::inventory::Inventory;
use sentinel_core::core::inventory::Lane;
use sentinel_core::core::inventory::Shipment;
use sentinel_core::core::inventory::ShipmentStatus;
use sentinel_core::core::time::Timestamp;
use serde::Deserialize;

use crate::SqliteStore;
use crate::errors::SqliteStoreError;

// ============================================================================
// SECTION: CSV Row Shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct FacilityRow {
    facility_id: String,
    city: String,
    state: String,
    #[serde(default)]
    country: Option<String>,
    criticality: u8,
}

#[derive(Debug, Deserialize)]
struct LaneRow {
    lane_id: String,
    origin_facility_id: String,
    destination_facility_id: String,
    volume: u8,
}

#[derive(Debug, Deserialize)]
struct ShipmentRow {
    shipment_id: String,
    lane_id: String,
    #[serde(default)]
    ship_date: Option<String>,
    #[serde(default)]
    eta_date: Option<String>,
    status: String,
    priority_flag: String,
}

// ============================================================================
// SECTION: Enum <-> TEXT
// ============================================================================

fn status_to_text(status: ShipmentStatus) -> &'static str {
    match status {
        ShipmentStatus::Pending => "PENDING",
        ShipmentStatus::InTransit => "INTRANSIT",
        ShipmentStatus::Scheduled => "SCHEDULED",
        ShipmentStatus::Delivered => "DELIVERED",
        ShipmentStatus::Cancelled => "CANCELLED",
    }
}

fn status_from_text(text: &str) -> Result<ShipmentStatus, SqliteStoreError> {
    let normalized = text.replace(['_', '-', ' '], "");
    match normalized.as_str() {
        "PENDING" => Ok(ShipmentStatus::Pending),
        "INTRANSIT" => Ok(ShipmentStatus::InTransit),
        "SCHEDULED" => Ok(ShipmentStatus::Scheduled),
        "DELIVERED" => Ok(ShipmentStatus::Delivered),
        "CANCELLED" => Ok(ShipmentStatus::Cancelled),
        other => Err(SqliteStoreError::Corrupt(format!("unknown shipment status: {other}"))),
    }
}

fn parse_priority_flag(raw: &str) -> Result<bool, SqliteStoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(SqliteStoreError::Invalid(format!("invalid priority_flag value: {other}"))),
    }
}

fn parse_optional_date(raw: &Option<String>) -> Result<Option<i64>, SqliteStoreError> {
    match raw.as_deref() {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => Timestamp::parse_rfc3339(text)
            .map(|timestamp| Some(timestamp.unix_millis()))
            .map_err(|err| SqliteStoreError::Invalid(format!("invalid date `{text}`: {err}"))),
    }
}

// ============================================================================
// SECTION: CSV Bootstrap (A3)
// ============================================================================

/// Loads facilities from a CSV file, upserting by `facility_id`.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the file cannot be read, a row fails to
/// parse, or the backend is unavailable.
pub fn load_facilities_csv(store: &SqliteStore, path: &Path) -> Result<usize, SqliteStoreError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    let connection = store.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
    let mut count = 0usize;
    for record in reader.deserialize::<FacilityRow>() {
        let row = record.map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        connection.execute(
            "INSERT INTO facilities (facility_id, city, state, country, criticality) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(facility_id) DO UPDATE SET city = excluded.city, state = excluded.state,
                country = excluded.country, criticality = excluded.criticality",
            params![row.facility_id, row.city, row.state, row.country, row.criticality],
        )?;
        count += 1;
    }
    Ok(count)
}

/// Loads lanes from a CSV file, upserting by `lane_id`.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the file cannot be read, a row fails to
/// parse, or the backend is unavailable.
pub fn load_lanes_csv(store: &SqliteStore, path: &Path) -> Result<usize, SqliteStoreError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    let connection = store.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
    let mut count = 0usize;
    for record in reader.deserialize::<LaneRow>() {
        let row = record.map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        connection.execute(
            "INSERT INTO lanes (lane_id, origin_facility_id, destination_facility_id, volume) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(lane_id) DO UPDATE SET origin_facility_id = excluded.origin_facility_id,
                destination_facility_id = excluded.destination_facility_id, volume = excluded.volume",
            params![row.lane_id, row.origin_facility_id, row.destination_facility_id, row.volume],
        )?;
        count += 1;
    }
    Ok(count)
}

/// Loads shipments from a CSV file, upserting by `shipment_id`.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the file cannot be read, a row fails to
/// parse, or the backend is unavailable.
pub fn load_shipments_csv(store: &SqliteStore, path: &Path) -> Result<usize, SqliteStoreError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    let connection = store.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
    let mut count = 0usize;
    for record in reader.deserialize::<ShipmentRow>() {
        let row = record.map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let ship_date = parse_optional_date(&row.ship_date)?;
        let eta_date = parse_optional_date(&row.eta_date)?;
        let status = status_from_text(&row.status.to_ascii_uppercase())?;
        let priority_flag = parse_priority_flag(&row.priority_flag)?;
        connection.execute(
            "INSERT INTO shipments (shipment_id, lane_id, ship_date, eta_date, status, priority_flag)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(shipment_id) DO UPDATE SET lane_id = excluded.lane_id, ship_date = excluded.ship_date,
                eta_date = excluded.eta_date, status = excluded.status, priority_flag = excluded.priority_flag",
            params![row.shipment_id, row.lane_id, ship_date, eta_date, status_to_text(status), i64::from(priority_flag)],
        )?;
        count += 1;
    }
    Ok(count)
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

fn row_to_facility(row: &rusqlite::Row<'_>) -> rusqlite::Result<Facility> {
    Ok(Facility {
        facility_id: FacilityId::new(row.get::<_, String>(0)?),
        city: row.get(1)?,
        state: row.get(2)?,
        country: row.get(3)?,
        criticality: row.get(4)?,
    })
}

fn row_to_lane(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lane> {
    Ok(Lane {
        lane_id: LaneId::new(row.get::<_, String>(0)?),
        origin_facility_id: FacilityId::new(row.get::<_, String>(1)?),
        destination_facility_id: FacilityId::new(row.get::<_, String>(2)?),
        volume: row.get(3)?,
    })
}

fn row_to_shipment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Shipment> {
    let status_text: String = row.get(4)?;
    let status = status_from_text(&status_text).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, "unknown shipment status".into())
    })?;
    let priority_flag: i64 = row.get(5)?;
    Ok(Shipment {
        shipment_id: ShipmentId::new(row.get::<_, String>(0)?),
        lane_id: LaneId::new(row.get::<_, String>(1)?),
        ship_date: row.get::<_, Option<i64>>(2)?.map(Timestamp::from_unix_millis),
        eta_date: row.get::<_, Option<i64>>(3)?.map(Timestamp::from_unix_millis),
        status,
        priority_flag: priority_flag != 0,
    })
}

// ============================================================================
// SECTION: Inventory
// ============================================================================

impl Inventory for SqliteStore {
    fn facilities_by_city_state(&self, city: &str, state_candidates: &[String]) -> Vec<Facility> {
        self.facilities_by_city_state_inner(city, state_candidates).unwrap_or_default()
    }

    fn facility_by_id(&self, facility_id: &FacilityId) -> Option<Facility> {
        self.facility_by_id_inner(facility_id).ok().flatten()
    }

    fn lanes_touching_facility(&self, facility_id: &FacilityId) -> Vec<Lane> {
        self.lanes_touching_facility_inner(facility_id).unwrap_or_default()
    }

    fn shipments_on_lanes(&self, lane_ids: &[LaneId]) -> Vec<Shipment> {
        self.shipments_on_lanes_inner(lane_ids).unwrap_or_default()
    }
}

impl SqliteStore {
    fn facilities_by_city_state_inner(&self, city: &str, state_candidates: &[String]) -> Result<Vec<Facility>, SqliteStoreError> {
        if state_candidates.is_empty() {
            return Ok(Vec::new());
        }
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let placeholders = state_candidates.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT facility_id, city, state, country, criticality FROM facilities
             WHERE city = ?1 COLLATE NOCASE AND state COLLATE NOCASE IN ({placeholders})"
        );
        let mut statement = connection.prepare(&sql)?;
        let mut bound: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(state_candidates.len() + 1);
        bound.push(&city);
        for candidate in state_candidates {
            bound.push(candidate);
        }
        let rows = statement.query_map(bound.as_slice(), row_to_facility)?;
        let mut facilities = Vec::new();
        for row in rows {
            facilities.push(row?);
        }
        Ok(facilities)
    }

    fn facility_by_id_inner(&self, facility_id: &FacilityId) -> Result<Option<Facility>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        connection
            .query_row(
                "SELECT facility_id, city, state, country, criticality FROM facilities WHERE facility_id = ?1",
                params![facility_id.as_str()],
                |row| row_to_facility(row),
            )
            .optional()
            .map_err(SqliteStoreError::from)
    }

    fn lanes_touching_facility_inner(&self, facility_id: &FacilityId) -> Result<Vec<Lane>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let mut statement = connection.prepare(
            "SELECT lane_id, origin_facility_id, destination_facility_id, volume FROM lanes
             WHERE origin_facility_id = ?1 OR destination_facility_id = ?1",
        )?;
        let rows = statement.query_map(params![facility_id.as_str()], row_to_lane)?;
        let mut lanes = Vec::new();
        for row in rows {
            lanes.push(row?);
        }
        Ok(lanes)
    }

    fn shipments_on_lanes_inner(&self, lane_ids: &[LaneId]) -> Result<Vec<Shipment>, SqliteStoreError> {
        if lane_ids.is_empty() {
            return Ok(Vec::new());
        }
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let placeholders = lane_ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT shipment_id, lane_id, ship_date, eta_date, status, priority_flag FROM shipments
             WHERE lane_id IN ({placeholders})"
        );
        let mut statement = connection.prepare(&sql)?;
        let bound: Vec<&str> = lane_ids.iter().map(LaneId::as_str).collect();
        let rows = statement.query_map(rusqlite::params_from_iter(bound.iter()), row_to_shipment)?;
        let mut shipments = Vec::new();
        for row in rows {
            shipments.push(row?);
        }
        Ok(shipments)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::SqliteStoreConfig;

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(SqliteStoreConfig::new(dir.path().join("sentinel.db"))).expect("store opens");
        (dir, store)
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create csv");
        file.write_all(contents.as_bytes()).expect("write csv");
        path
    }

    #[test]
    fn loads_facilities_and_queries_by_city_state() {
        let (dir, store) = store();
        let path = write_csv(
            &dir,
            "facilities.csv",
            "facility_id,city,state,country,criticality\nPLANT-01,Houston,TX,US,8\n",
        );
        let loaded = load_facilities_csv(&store, &path).expect("load");
        assert_eq!(loaded, 1);

        let facilities = store.facilities_by_city_state("houston", &["TX".to_string()]);
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].facility_id.as_str(), "PLANT-01");
    }

    #[test]
    fn loads_lanes_and_finds_by_facility() {
        let (dir, store) = store();
        let facilities_path = write_csv(
            &dir,
            "facilities.csv",
            "facility_id,city,state,country,criticality\nPLANT-01,Houston,TX,US,8\nPLANT-02,Dallas,TX,US,5\n",
        );
        load_facilities_csv(&store, &facilities_path).expect("load facilities");
        let lanes_path = write_csv(
            &dir,
            "lanes.csv",
            "lane_id,origin_facility_id,destination_facility_id,volume\nLANE-001,PLANT-01,PLANT-02,6\n",
        );
        load_lanes_csv(&store, &lanes_path).expect("load lanes");

        let lanes = store.lanes_touching_facility(&FacilityId::new("PLANT-02"));
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].lane_id.as_str(), "LANE-001");
    }

    #[test]
    fn loads_shipments_and_filters_by_lane() {
        let (dir, store) = store();
        let path = write_csv(
            &dir,
            "shipments.csv",
            "shipment_id,lane_id,ship_date,eta_date,status,priority_flag\n\
             SHP-1001,LANE-001,2026-01-01T00:00:00Z,2026-01-03T00:00:00Z,in_transit,true\n",
        );
        let loaded = load_shipments_csv(&store, &path).expect("load");
        assert_eq!(loaded, 1);

        let shipments = store.shipments_on_lanes(&[LaneId::new("LANE-001")]);
        assert_eq!(shipments.len(), 1);
        assert!(shipments[0].priority_flag);
        assert!(shipments[0].status.is_active());
    }

    #[test]
    fn re_loading_csv_upserts_rather_than_duplicates() {
        let (dir, store) = store();
        let path = write_csv(
            &dir,
            "facilities.csv",
            "facility_id,city,state,country,criticality\nPLANT-01,Houston,TX,US,8\n",
        );
        load_facilities_csv(&store, &path).expect("first load");
        load_facilities_csv(&store, &path).expect("second load");
        let facilities = store.facilities_by_city_state("Houston", &["TX".to_string()]);
        assert_eq!(facilities.len(), 1);
    }
}
