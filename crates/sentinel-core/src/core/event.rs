// crates/sentinel-core/src/core/event.rs
// ============================================================================
// Module: Sentinel Event Model
// Description: Canonicalized signal produced by C3 and consumed by C4-C8.
// Purpose: Provide a tagged, explicit-field event type (no stringly-typed dicts).
// Dependencies: serde, serde_json, crate::core::identifiers, crate::core::time
// ============================================================================

//! ## Overview
//! [`Event`] is a tagged record with explicit optional fields plus an
//! extension map for payload-specific data the canonicalizer did not lift
//! into a named field. Confidence and provenance are tracked per linking
//! channel so downstream components (C5, C6) never have to guess whether a
//! channel was attempted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::EventId;
use crate::core::identifiers::FacilityId;
use crate::core::identifiers::LaneId;
use crate::core::identifiers::RawItemId;
use crate::core::identifiers::ShipmentId;
use crate::core::identifiers::SourceId;
use crate::core::raw_item::Tier;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Event Type
// ============================================================================

/// Risk category derived from keyword scanning (§4.2 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    /// Weather hazard (storm, flood, freeze, ...).
    Weather,
    /// Chemical/hazmat spill or leak.
    Spill,
    /// Labor action (strike, walkout, ...).
    Strike,
    /// Facility/lane closure or shutdown.
    Closure,
    /// Regulatory action (fine, sanction, audit, ...).
    Reg,
    /// Product recall or withdrawal.
    Recall,
    /// No keyword group matched.
    Other,
}

impl EventType {
    /// Returns the canonical uppercase label used in correlation keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "WEATHER",
            Self::Spill => "SPILL",
            Self::Strike => "STRIKE",
            Self::Closure => "CLOSURE",
            Self::Reg => "REG",
            Self::Recall => "RECALL",
            Self::Other => "OTHER",
        }
    }
}

// ============================================================================
// SECTION: Link Confidence / Provenance
// ============================================================================

/// Linking channel confidence scores, `[0.0, 1.0]`.
///
/// # Invariants
/// - A channel defaults to `0.0`, never `1.0`, when it was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkConfidence {
    /// Facility-resolution confidence.
    pub facility: f64,
    /// Lane-resolution confidence.
    pub lanes: f64,
    /// Shipment-resolution confidence.
    pub shipments: f64,
}

impl Default for LinkConfidence {
    fn default() -> Self {
        Self {
            facility: 0.0,
            lanes: 0.0,
            shipments: 0.0,
        }
    }
}

/// Facility match provenance tag (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityProvenance {
    /// Facility ids were already present on the event.
    Provided,
    /// Resolved from an unambiguous city/state match.
    CityState,
    /// Resolved from a city/state match with multiple candidates.
    CityStateAmbiguous,
    /// Resolved from an exact facility-id token in the text.
    FacilityIdExact,
    /// No facility could be resolved.
    None,
}

impl FacilityProvenance {
    /// Returns the wire-format label used in diagnostics JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provided => "PROVIDED",
            Self::CityState => "CITY_STATE",
            Self::CityStateAmbiguous => "CITY_STATE_AMBIGUOUS",
            Self::FacilityIdExact => "FACILITY_ID_EXACT",
            Self::None => "",
        }
    }
}

// ============================================================================
// SECTION: Event
// ============================================================================

/// A canonicalized risk signal.
///
/// # Invariants
/// - `facilities`/`lanes`/`shipments` are deduplicated and stored in
///   deterministic (sorted) order.
/// - `link_confidence` channels default to `0.0`, never `1.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Opaque or deterministic event identifier.
    pub event_id: EventId,
    /// Identifier of the source that produced this event.
    pub source_id: SourceId,
    /// Weak back-reference to the originating raw item.
    pub raw_id: RawItemId,
    /// Source tier at canonicalization time.
    pub tier: Tier,
    /// Source trustworthiness modifier, 1-3 (default 2).
    pub trust_tier: u8,
    /// Minimum classification the source config demands, 0-2 (default 0).
    pub classification_floor: u8,
    /// Small signed scoring adjustment (default 0).
    pub weighting_bias: i32,
    /// Derived risk category.
    pub event_type: EventType,
    /// Candidate/adapter-provided title.
    pub title: String,
    /// Candidate/adapter-provided raw text (title + body, concatenated).
    pub raw_text: String,
    /// Extracted or configured location hint, when any.
    pub location_hint: Option<String>,
    /// Resolved facility ids, deduplicated and sorted.
    pub facilities: BTreeSet<FacilityId>,
    /// Resolved lane ids, deduplicated and sorted.
    pub lanes: BTreeSet<LaneId>,
    /// Resolved shipment ids, deduplicated and sorted.
    pub shipments: BTreeSet<ShipmentId>,
    /// Per-channel link confidence.
    pub link_confidence: LinkConfidence,
    /// Facility link provenance tag.
    pub link_provenance: FacilityProvenance,
    /// Human-readable notes recorded during linking, in order.
    pub linking_notes: Vec<String>,
    /// Total shipments matched before the per-event cap was applied.
    pub shipments_total_linked: usize,
    /// Set when the shipment cap (§4.3) truncated the match set.
    pub shipments_truncated: bool,
    /// Payload fields not lifted into a named field above.
    #[serde(default)]
    pub extensions: BTreeMap<String, Value>,
}

impl Event {
    /// Returns the combined, uppercased title+body text used by keyword scans.
    #[must_use]
    pub fn uppercased_text(&self) -> String {
        format!("{} {}", self.title, self.raw_text).to_uppercase()
    }
}
