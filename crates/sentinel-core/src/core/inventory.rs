// crates/sentinel-core/src/core/inventory.rs
// ============================================================================
// Module: Sentinel Network Inventory Model
// Description: Read-only facility/lane/shipment entities loaded from CSV.
// Purpose: Provide the network state C4 (linker) and C5 (scorer) query against.
// Dependencies: serde, crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! Facilities, lanes, and shipments are loaded once (by an ambient CSV
//! loader, outside this crate) and treated as read-only during ingest. The
//! [`Inventory`] trait is the seam the linker and scorer use to query them
//! without depending on a concrete storage backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FacilityId;
use crate::core::identifiers::LaneId;
use crate::core::identifiers::ShipmentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Facility
// ============================================================================

/// A network facility (plant, warehouse, port, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Facility identifier, e.g. `"PLANT-01"`.
    pub facility_id: FacilityId,
    /// Facility city, used for city/state resolution.
    pub city: String,
    /// Facility state (2-letter or full name as loaded).
    pub state: String,
    /// Facility country, when tracked.
    pub country: Option<String>,
    /// Operational criticality, 1-10.
    pub criticality: u8,
}

// ============================================================================
// SECTION: Lane
// ============================================================================

/// A transportation lane between two facilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    /// Lane identifier, e.g. `"LANE-001"`.
    pub lane_id: LaneId,
    /// Origin facility.
    pub origin_facility_id: FacilityId,
    /// Destination facility.
    pub destination_facility_id: FacilityId,
    /// Shipment volume carried, 1-10.
    pub volume: u8,
}

// ============================================================================
// SECTION: Shipment
// ============================================================================

/// Shipment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipmentStatus {
    /// Not yet departed.
    Pending,
    /// Currently in transit.
    InTransit,
    /// Scheduled for a future date.
    Scheduled,
    /// Delivered; no longer active.
    Delivered,
    /// Cancelled; no longer active.
    Cancelled,
}

impl ShipmentStatus {
    /// Returns true when the status counts as "active" for date-less inclusion.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InTransit | Self::Scheduled)
    }
}

/// A shipment traveling a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Shipment identifier, e.g. `"SHP-1001"`.
    pub shipment_id: ShipmentId,
    /// Lane this shipment travels.
    pub lane_id: LaneId,
    /// Scheduled ship date, when known.
    pub ship_date: Option<Timestamp>,
    /// Estimated arrival date, when known.
    pub eta_date: Option<Timestamp>,
    /// Current lifecycle status.
    pub status: ShipmentStatus,
    /// Whether this shipment is flagged priority.
    pub priority_flag: bool,
}

// ============================================================================
// SECTION: Inventory Seam
// ============================================================================

/// Read-only view over the network inventory tables.
///
/// Implementations must be side-effect free: the linker and scorer call
/// these methods freely and may call them more than once per event.
pub trait Inventory {
    /// Returns facilities matching a case-insensitive city/state query.
    ///
    /// `state_candidates` includes every normalized form (2-letter and
    /// known full names) the linker considers equivalent.
    fn facilities_by_city_state(&self, city: &str, state_candidates: &[String]) -> Vec<Facility>;

    /// Looks up a facility by exact id, when it exists.
    fn facility_by_id(&self, facility_id: &FacilityId) -> Option<Facility>;

    /// Returns lanes whose origin or destination is `facility_id`.
    fn lanes_touching_facility(&self, facility_id: &FacilityId) -> Vec<Lane>;

    /// Returns shipments traveling any of `lane_ids`.
    fn shipments_on_lanes(&self, lane_ids: &[LaneId]) -> Vec<Shipment>;
}
