// crates/sentinel-core/src/scorer.rs
// ============================================================================
// Module: Sentinel Impact Scorer (C5)
// Description: Compute an integer impact score from a linked event (§4.4).
// Purpose: Produce (impact_score, breakdown, rationale) deterministically.
// Dependencies: crate::core::{event, inventory, time}
// ============================================================================

//! ## Overview
//! Rules R1-R7 each contribute at most once; trust tier and weighting bias
//! add a small signed adjustment after rule scoring, then the total is
//! clamped to `[0, 10]`. See §9 "Open question" for the pinned arithmetic
//! order this module follows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::event::Event;
use crate::core::event::EventType;
use crate::core::inventory::Inventory;
use crate::core::inventory::Lane;
use crate::core::inventory::Shipment;
use crate::core::time::Timestamp;

const HIGH_CRITICALITY_THRESHOLD: u8 = 7;
const HIGH_VOLUME_THRESHOLD: u8 = 7;
const MANY_PRIORITY_SHIPMENTS_THRESHOLD: usize = 5;
const MANY_SHIPMENTS_THRESHOLD: usize = 10;
const IMMINENT_ETA_HOURS: i64 = 48;
const CLOSURE_TEXT_MARKERS: &[&str] = &["SPILL", "STRIKE", "CLOSURE", "CLOSED", "SHUTDOWN"];

// ============================================================================
// SECTION: Score Outcome
// ============================================================================

/// Result of scoring an event's operational impact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// Final impact score, clamped to `[0, 10]`.
    pub impact_score: i32,
    /// Firing rules, in rule order.
    pub breakdown: Vec<String>,
    /// Short joined-breakdown rationale string.
    pub rationale: String,
}

fn tier_bonus(trust_tier: u8) -> i32 {
    match trust_tier {
        3 => 1,
        1 => -1,
        _ => 0,
    }
}

// ============================================================================
// SECTION: Score
// ============================================================================

/// Computes the impact score for a linked event (C5).
#[must_use]
pub fn score_impact(event: &Event, inventory: &dyn Inventory, now: Timestamp) -> ScoreOutcome {
    let facilities: Vec<_> = event.facilities.iter().filter_map(|id| inventory.facility_by_id(id)).collect();
    let lanes: Vec<Lane> = event
        .facilities
        .iter()
        .flat_map(|id| inventory.lanes_touching_facility(id))
        .collect();
    let lane_ids: Vec<_> = event.lanes.iter().cloned().collect();
    let shipments: Vec<Shipment> = inventory.shipments_on_lanes(&lane_ids);
    let priority_shipments: Vec<&Shipment> = shipments.iter().filter(|s| s.priority_flag).collect();

    let mut breakdown = Vec::new();
    let mut rule_sum = 0i32;

    if facilities.iter().any(|f| f.criticality >= HIGH_CRITICALITY_THRESHOLD) {
        breakdown.push("R1: linked facility criticality >= 7".to_string());
        rule_sum += 2;
    }
    if lanes.iter().any(|lane| lane.volume >= HIGH_VOLUME_THRESHOLD) {
        breakdown.push("R2: linked lane volume >= 7".to_string());
        rule_sum += 1;
    }
    if !priority_shipments.is_empty() {
        breakdown.push("R3: priority shipment linked".to_string());
        rule_sum += 1;
    }
    if priority_shipments.len() >= MANY_PRIORITY_SHIPMENTS_THRESHOLD {
        breakdown.push("R4: 5 or more priority shipments linked".to_string());
        rule_sum += 1;
    }
    if priority_shipments.iter().any(|s| {
        s.eta_date.is_some_and(|eta| eta.abs_diff_hours(now) <= IMMINENT_ETA_HOURS)
    }) {
        breakdown.push("R5: priority shipment eta within 48h".to_string());
        rule_sum += 1;
    }
    if shipments.len() >= MANY_SHIPMENTS_THRESHOLD {
        breakdown.push("R6: linked shipment count >= 10".to_string());
        rule_sum += 1;
    }
    let uppercased = event.uppercased_text();
    if matches!(event.event_type, EventType::Spill | EventType::Strike | EventType::Closure)
        || CLOSURE_TEXT_MARKERS.iter().any(|marker| uppercased.contains(marker))
    {
        breakdown.push("R7: high-impact event type or text marker".to_string());
        rule_sum += 1;
    }

    let adjusted = rule_sum + event.weighting_bias + tier_bonus(event.trust_tier);
    let impact_score = adjusted.clamp(0, 10);
    let rationale = breakdown.join(", ");

    ScoreOutcome {
        impact_score,
        breakdown,
        rationale,
    }
}

/// Maps an impact score to a classification (§4.4 classification mapping).
#[must_use]
pub const fn classification_from_score(impact_score: i32) -> u8 {
    if impact_score >= 4 {
        2
    } else if impact_score >= 2 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifiers::FacilityId;
    use crate::core::identifiers::LaneId;
    use crate::core::identifiers::ShipmentId;
    use crate::core::inventory::Facility;
    use crate::core::inventory::ShipmentStatus;
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    struct FixtureInventory {
        facility: Facility,
        lane: Lane,
        shipment: Shipment,
    }

    impl Inventory for FixtureInventory {
        fn facilities_by_city_state(&self, _city: &str, _state_candidates: &[String]) -> Vec<Facility> {
            Vec::new()
        }

        fn facility_by_id(&self, facility_id: &FacilityId) -> Option<Facility> {
            (facility_id == &self.facility.facility_id).then(|| self.facility.clone())
        }

        fn lanes_touching_facility(&self, facility_id: &FacilityId) -> Vec<Lane> {
            if facility_id == &self.facility.facility_id {
                vec![self.lane.clone()]
            } else {
                Vec::new()
            }
        }

        fn shipments_on_lanes(&self, lane_ids: &[LaneId]) -> Vec<Shipment> {
            if lane_ids.contains(&self.lane.lane_id) {
                vec![self.shipment.clone()]
            } else {
                Vec::new()
            }
        }
    }

    fn fixture_event(facility_id: FacilityId, lane_id: LaneId, shipment_id: ShipmentId) -> Event {
        let mut facilities = BTreeSet::new();
        facilities.insert(facility_id);
        let mut lanes = BTreeSet::new();
        lanes.insert(lane_id);
        let mut shipments = BTreeSet::new();
        shipments.insert(shipment_id);
        Event {
            event_id: crate::core::identifiers::EventId::new("EVT-1"),
            source_id: crate::core::identifiers::SourceId::new("SRC-1"),
            raw_id: crate::core::identifiers::RawItemId::new("RAW-1"),
            tier: crate::core::raw_item::Tier::Regional,
            trust_tier: 2,
            classification_floor: 0,
            weighting_bias: 0,
            event_type: EventType::Spill,
            title: "Chemical spill at PLANT-01 facility".into(),
            raw_text: String::new(),
            location_hint: None,
            facilities,
            lanes,
            shipments,
            link_confidence: crate::core::event::LinkConfidence::default(),
            link_provenance: crate::core::event::FacilityProvenance::FacilityIdExact,
            linking_notes: Vec::new(),
            shipments_total_linked: 1,
            shipments_truncated: false,
            extensions: BTreeMap::new(),
        }
    }

    #[test]
    fn spill_at_high_criticality_plant_scores_at_least_three() {
        let facility_id = FacilityId::new("PLANT-01");
        let lane_id = LaneId::new("LANE-001");
        let shipment_id = ShipmentId::new("SHP-1");
        let inventory = FixtureInventory {
            facility: Facility {
                facility_id: facility_id.clone(),
                city: "Houston".into(),
                state: "TX".into(),
                country: None,
                criticality: 8,
            },
            lane: Lane {
                lane_id: lane_id.clone(),
                origin_facility_id: facility_id.clone(),
                destination_facility_id: facility_id.clone(),
                volume: 8,
            },
            shipment: Shipment {
                shipment_id: shipment_id.clone(),
                lane_id: lane_id.clone(),
                ship_date: None,
                eta_date: None,
                status: ShipmentStatus::InTransit,
                priority_flag: false,
            },
        };
        let event = fixture_event(facility_id, lane_id, shipment_id);
        let outcome = score_impact(&event, &inventory, Timestamp::from_unix_millis(0));
        assert!(outcome.impact_score >= 3, "expected >= 3, got {}", outcome.impact_score);
        assert_eq!(classification_from_score(outcome.impact_score), 2);
    }

    #[test]
    fn score_clamps_to_ten() {
        let facility_id = FacilityId::new("PLANT-01");
        let lane_id = LaneId::new("LANE-001");
        let shipment_id = ShipmentId::new("SHP-1");
        let inventory = FixtureInventory {
            facility: Facility {
                facility_id: facility_id.clone(),
                city: "Houston".into(),
                state: "TX".into(),
                country: None,
                criticality: 10,
            },
            lane: Lane {
                lane_id: lane_id.clone(),
                origin_facility_id: facility_id.clone(),
                destination_facility_id: facility_id.clone(),
                volume: 10,
            },
            shipment: Shipment {
                shipment_id: shipment_id.clone(),
                lane_id: lane_id.clone(),
                ship_date: None,
                eta_date: None,
                status: ShipmentStatus::InTransit,
                priority_flag: true,
            },
        };
        let mut event = fixture_event(facility_id, lane_id, shipment_id);
        event.weighting_bias = 100;
        let outcome = score_impact(&event, &inventory, Timestamp::from_unix_millis(0));
        assert_eq!(outcome.impact_score, 10);
    }
}
