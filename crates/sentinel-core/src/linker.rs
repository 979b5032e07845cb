// crates/sentinel-core/src/linker.rs
// ============================================================================
// Module: Sentinel Network Linker (C4)
// Description: Resolve an event's location/facility hints against the inventory.
// Purpose: Populate facilities, lanes, shipments, link confidence, provenance.
// Dependencies: regex, crate::core::{event, inventory, time}
// ============================================================================

//! ## Overview
//! Resolution is a strict cascade: provided facility ids, then city/state,
//! then an exact facility-id token in the text, then nothing. Lane and
//! shipment resolution both depend on the facilities the cascade found.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::event::Event;
use crate::core::event::FacilityProvenance;
use crate::core::identifiers::FacilityId;
use crate::core::identifiers::LaneId;
use crate::core::identifiers::ShipmentId;
use crate::core::inventory::Inventory;
use crate::core::inventory::ShipmentStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: State Table
// ============================================================================

/// Maps a full US state name (lowercase) to its 2-letter postal code.
///
/// Extensible: unrecognized full names simply fail to normalize and are
/// compared as-is.
fn us_state_abbreviation(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    Some(match lower.as_str() {
        "alabama" => "AL",
        "alaska" => "AK",
        "arizona" => "AZ",
        "arkansas" => "AR",
        "california" => "CA",
        "colorado" => "CO",
        "connecticut" => "CT",
        "delaware" => "DE",
        "florida" => "FL",
        "georgia" => "GA",
        "hawaii" => "HI",
        "idaho" => "ID",
        "illinois" => "IL",
        "indiana" => "IN",
        "iowa" => "IA",
        "kansas" => "KS",
        "kentucky" => "KY",
        "louisiana" => "LA",
        "maine" => "ME",
        "maryland" => "MD",
        "massachusetts" => "MA",
        "michigan" => "MI",
        "minnesota" => "MN",
        "mississippi" => "MS",
        "missouri" => "MO",
        "montana" => "MT",
        "nebraska" => "NE",
        "nevada" => "NV",
        "new hampshire" => "NH",
        "new jersey" => "NJ",
        "new mexico" => "NM",
        "new york" => "NY",
        "north carolina" => "NC",
        "north dakota" => "ND",
        "ohio" => "OH",
        "oklahoma" => "OK",
        "oregon" => "OR",
        "pennsylvania" => "PA",
        "rhode island" => "RI",
        "south carolina" => "SC",
        "south dakota" => "SD",
        "tennessee" => "TN",
        "texas" => "TX",
        "utah" => "UT",
        "vermont" => "VT",
        "virginia" => "VA",
        "washington" => "WA",
        "west virginia" => "WV",
        "wisconsin" => "WI",
        "wyoming" => "WY",
        _ => return None,
    })
}

/// Normalizes a state token to every form the linker considers equivalent.
fn normalize_state_candidates(state: &str) -> Vec<String> {
    let trimmed = state.trim();
    if trimmed.len() == 2 {
        return vec![trimmed.to_uppercase()];
    }
    match us_state_abbreviation(trimmed) {
        Some(abbrev) => vec![abbrev.to_string(), trimmed.to_string()],
        None => vec![trimmed.to_string()],
    }
}

// ============================================================================
// SECTION: Regex Helpers
// ============================================================================

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn city_state_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*),\s+([A-Z]{2}|[A-Z][a-z]+)\b")
            .expect("static regex is valid")
    })
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn facility_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z]+-\d+)\b").expect("static regex is valid"))
}

// ============================================================================
// SECTION: Link Outcome
// ============================================================================

/// Configuration for the shipment-inclusion window and cap.
#[derive(Debug, Clone, Copy)]
pub struct LinkerConfig {
    /// Shipment inclusion window, in days ahead of `today` (default 30).
    pub days_ahead: i64,
    /// Maximum shipments linked per event (default 50).
    pub shipment_cap: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            days_ahead: 30,
            shipment_cap: 50,
        }
    }
}

/// Result of linking an event against the inventory; mutates the event directly.
#[derive(Debug, Clone, Default)]
pub struct LinkOutcome {
    /// Human-readable notes recorded during linking, in order.
    pub notes: Vec<String>,
}

// ============================================================================
// SECTION: Link
// ============================================================================

/// Resolves `event`'s facilities, lanes, and shipments against `inventory` (C4).
///
/// `now` must come from the injected clock, never from wall time.
pub fn link(event: &mut Event, inventory: &dyn Inventory, now: Timestamp, config: LinkerConfig) -> LinkOutcome {
    let mut notes = Vec::new();

    if !event.facilities.is_empty() {
        event.link_provenance = FacilityProvenance::Provided;
        event.link_confidence.facility = 1.0;
        notes.push("facility ids provided on event; accepted as-is".to_string());
    } else {
        resolve_facilities_by_city_state(event, inventory, &mut notes);
        if event.facilities.is_empty() {
            resolve_facilities_by_text_token(event, inventory, &mut notes);
        }
    }
    if event.facilities.is_empty() {
        event.link_provenance = FacilityProvenance::None;
        event.link_confidence.facility = 0.0;
        notes.push("no facility could be resolved".to_string());
    }

    resolve_lanes(event, inventory, &mut notes);
    resolve_shipments(event, inventory, now, config, &mut notes);

    event.linking_notes.extend(notes.clone());
    LinkOutcome { notes }
}

fn resolve_facilities_by_city_state(event: &mut Event, inventory: &dyn Inventory, notes: &mut Vec<String>) {
    let Some(hint) = event.location_hint.as_deref() else {
        return;
    };
    let Some(caps) = city_state_regex().captures(hint) else {
        return;
    };
    let city = &caps[1];
    let state_candidates = normalize_state_candidates(&caps[2]);
    let matches = inventory.facilities_by_city_state(city, &state_candidates);
    match matches.len() {
        0 => {}
        1 => {
            event.facilities.insert(matches[0].facility_id.clone());
            event.link_provenance = FacilityProvenance::CityState;
            event.link_confidence.facility = 0.75;
            notes.push(format!("resolved facility by city/state match: {city}"));
        }
        _ => {
            for facility in matches {
                event.facilities.insert(facility.facility_id);
            }
            event.link_provenance = FacilityProvenance::CityStateAmbiguous;
            event.link_confidence.facility = 0.55;
            notes.push(format!("ambiguous city/state match for {city}: multiple facilities"));
        }
    }
}

fn resolve_facilities_by_text_token(event: &mut Event, inventory: &dyn Inventory, notes: &mut Vec<String>) {
    let text = format!("{} {}", event.title, event.raw_text);
    let mut found = BTreeSet::new();
    for caps in facility_id_regex().captures_iter(&text) {
        let token = FacilityId::new(&caps[1]);
        if inventory.facility_by_id(&token).is_some() {
            found.insert(token);
        }
    }
    if !found.is_empty() {
        notes.push("resolved facility by exact facility-id token in text".to_string());
        event.facilities.extend(found);
        event.link_provenance = FacilityProvenance::FacilityIdExact;
        event.link_confidence.facility = 1.0;
    }
}

fn resolve_lanes(event: &mut Event, inventory: &dyn Inventory, notes: &mut Vec<String>) {
    let mut lanes: BTreeSet<LaneId> = BTreeSet::new();
    for facility_id in &event.facilities {
        for lane in inventory.lanes_touching_facility(facility_id) {
            lanes.insert(lane.lane_id);
        }
    }
    if lanes.is_empty() {
        event.link_confidence.lanes = 0.0;
    } else {
        notes.push(format!("resolved {} lane(s) touching linked facilities", lanes.len()));
        event.link_confidence.lanes = 0.75;
    }
    event.lanes = lanes;
}

fn resolve_shipments(
    event: &mut Event,
    inventory: &dyn Inventory,
    now: Timestamp,
    config: LinkerConfig,
    notes: &mut Vec<String>,
) {
    if event.lanes.is_empty() {
        event.link_confidence.shipments = 0.0;
        return;
    }
    let lane_ids: Vec<LaneId> = event.lanes.iter().cloned().collect();
    let window_end = now.plus_days(config.days_ahead);

    let mut matched: Vec<ShipmentId> = Vec::new();
    for shipment in inventory.shipments_on_lanes(&lane_ids) {
        let in_ship_window = shipment
            .ship_date
            .is_some_and(|date| date >= now && date <= window_end);
        let in_eta_window = shipment
            .eta_date
            .is_some_and(|date| date >= now && date <= window_end);
        let no_dates_but_active = shipment.ship_date.is_none() && shipment.eta_date.is_none() && shipment.status.is_active();
        if in_ship_window || in_eta_window || no_dates_but_active {
            matched.push(shipment.shipment_id);
        }
    }

    event.shipments_total_linked = matched.len();
    if matched.len() > config.shipment_cap {
        matched.truncate(config.shipment_cap);
        event.shipments_truncated = true;
        notes.push(format!(
            "shipment match set truncated to configured cap of {}",
            config.shipment_cap
        ));
    }
    if matched.is_empty() {
        event.link_confidence.shipments = 0.0;
    } else {
        notes.push(format!("resolved {} shipment(s) on linked lanes", matched.len()));
        event.link_confidence.shipments = 0.60;
    }
    event.shipments = matched.into_iter().collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_state_candidates_handles_full_name() {
        let candidates = normalize_state_candidates("Texas");
        assert!(candidates.contains(&"TX".to_string()));
    }

    #[test]
    fn normalize_state_candidates_passes_through_two_letter() {
        assert_eq!(normalize_state_candidates("tx"), vec!["TX".to_string()]);
    }
}
