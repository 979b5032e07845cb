// crates/sentinel-core/src/canonicalize.rs
// ============================================================================
// Module: Sentinel Event Canonicalizer (C3)
// Description: Raw item + source config -> canonical Event.
// Purpose: Derive event type, location hint, and trust metadata deterministically.
// Dependencies: regex, serde_json, crate::core::{event, hashing, identifiers, raw_item, time}
// ============================================================================

//! ## Overview
//! Canonicalization never touches the network or the wall clock. Every
//! output field is derived from the raw item, the source configuration,
//! and an injected [`crate::core::idgen::IdGenerator`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::core::event::Event;
use crate::core::event::EventType;
use crate::core::event::FacilityProvenance;
use crate::core::event::LinkConfidence;
use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::hash_canonical_json;
use crate::core::idgen::IdGenerator;
use crate::core::identifiers::EventId;
use crate::core::raw_item::RawItem;

// ============================================================================
// SECTION: Source Config
// ============================================================================

/// Geo hints carried on a source configuration entry.
#[derive(Debug, Clone, Default)]
pub struct GeoHint {
    /// Configured city.
    pub city: Option<String>,
    /// Configured state.
    pub state: Option<String>,
    /// Configured country.
    pub country: Option<String>,
}

/// Per-source trust and canonicalization metadata (§6 source config schema).
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Source trustworthiness modifier, 1-3.
    pub trust_tier: u8,
    /// Minimum classification the source config demands, 0-2.
    pub classification_floor: u8,
    /// Small signed scoring adjustment.
    pub weighting_bias: i32,
    /// Optional geo hint for location extraction.
    pub geo: Option<GeoHint>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            trust_tier: 2,
            classification_floor: 0,
            weighting_bias: 0,
            geo: None,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while canonicalizing a raw item into an event.
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// The raw item's payload was not a JSON object.
    #[error("raw item payload is not a json object")]
    NotAnObject,
    /// Hashing the resulting event failed.
    #[error("failed to hash canonicalized event: {0}")]
    Hashing(#[from] crate::core::hashing::HashError),
}

// ============================================================================
// SECTION: Keyword Groups
// ============================================================================

const WEATHER_KEYWORDS: &[&str] = &[
    "hurricane",
    "tornado",
    "flood",
    "storm",
    "blizzard",
    "snow",
    "ice",
    "warning",
    "watch",
    "alert",
    "severe weather",
    "thunderstorm",
    "wind",
    "hail",
    "freeze",
    "frost",
    "heat",
    "drought",
];
const SPILL_KEYWORDS: &[&str] = &[
    "spill",
    "leak",
    "contamination",
    "chemical release",
    "hazardous material",
    "oil spill",
    "toxic",
    "pollution",
];
const STRIKE_KEYWORDS: &[&str] = &[
    "strike",
    "labor dispute",
    "work stoppage",
    "union",
    "walkout",
    "picketing",
    "lockout",
];
const CLOSURE_KEYWORDS: &[&str] = &[
    "closure",
    "closed",
    "shutdown",
    "shut down",
    "suspended",
    "halted",
    "blocked",
    "barricade",
    "evacuation",
    "emergency closure",
];
const REG_KEYWORDS: &[&str] = &[
    "regulation",
    "regulatory",
    "compliance",
    "violation",
    "fine",
    "penalty",
    "inspection",
    "audit",
    "sanction",
    "ban",
    "prohibition",
];
const RECALL_KEYWORDS: &[&str] = &[
    "recall",
    "recalled",
    "withdrawal",
    "removed from market",
    "voluntary recall",
];

/// Scans lowercased text against the ordered keyword groups (§4.2 step 1).
#[must_use]
pub fn derive_event_type(lowercased_text: &str) -> EventType {
    let groups: [(EventType, &[&str]); 6] = [
        (EventType::Weather, WEATHER_KEYWORDS),
        (EventType::Spill, SPILL_KEYWORDS),
        (EventType::Strike, STRIKE_KEYWORDS),
        (EventType::Closure, CLOSURE_KEYWORDS),
        (EventType::Reg, REG_KEYWORDS),
        (EventType::Recall, RECALL_KEYWORDS),
    ];
    for (event_type, keywords) in groups {
        if keywords.iter().any(|kw| lowercased_text.contains(kw)) {
            return event_type;
        }
    }
    EventType::Other
}

// ============================================================================
// SECTION: Location Hint
// ============================================================================

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn city_state_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*),\s+([A-Z]{2}|[A-Z][a-z]+)\b")
            .expect("static regex is valid")
    })
}

const PAYLOAD_LOCATION_FIELDS: &[&str] = &["areaDesc", "location", "area", "region", "city", "state"];

/// Builds a location hint from geo config, payload fields, or text regex (§4.2 step 2).
#[must_use]
pub fn derive_location_hint(geo: Option<&GeoHint>, payload: &Value, text: &str) -> Option<String> {
    if let Some(geo) = geo
        && let Some(city) = geo.city.as_deref()
    {
        return Some(match geo.state.as_deref() {
            Some(state) => format!("{city}, {state}"),
            None => city.to_string(),
        });
    }
    if let Value::Object(map) = payload {
        for field in PAYLOAD_LOCATION_FIELDS {
            if let Some(Value::String(value)) = map.get(*field)
                && !value.is_empty()
            {
                return Some(value.clone());
            }
        }
    }
    city_state_regex()
        .captures(text)
        .map(|caps| format!("{}, {}", &caps[1], &caps[2]))
}

// ============================================================================
// SECTION: Canonicalize
// ============================================================================

/// Stable projection hashed to produce the canonicalized event's diagnostic hash.
#[derive(Debug, Clone, serde::Serialize)]
struct EventHashProjection<'a> {
    event_type: &'static str,
    title: &'a str,
    raw_text: &'a str,
    location_hint: &'a Option<String>,
    trust_tier: u8,
    classification_floor: u8,
    weighting_bias: i32,
}

/// Canonicalizes a raw item into an [`Event`] (C3).
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when the payload is not a JSON object or
/// the resulting event cannot be hashed.
pub fn canonicalize(
    item: &RawItem,
    source_config: &SourceConfig,
    id_generator: &mut dyn IdGenerator,
) -> Result<(Event, HashDigest), CanonicalizeError> {
    let Value::Object(payload) = &item.payload else {
        return Err(CanonicalizeError::NotAnObject);
    };

    let title = item.title.clone().unwrap_or_default();
    let body = payload
        .get("body")
        .or_else(|| payload.get("summary"))
        .or_else(|| payload.get("description"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let raw_text = body.to_string();
    let combined_lower = format!("{title} {raw_text}").to_lowercase();

    let event_type = derive_event_type(&combined_lower);
    let location_hint = derive_location_hint(source_config.geo.as_ref(), &item.payload, &format!("{title} {raw_text}"));

    let event_id = payload
        .get("event_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| item.canonical_id.clone())
        .unwrap_or_else(|| item.raw_id.as_str().to_string());
    // `item.raw_id` is always present, so this fallback chain never actually
    // bottoms out; `id_generator` is threaded through for the case a future
    // staging path constructs a `RawItem` without one.
    let event_id = if event_id.is_empty() {
        let date = item.fetched_at.to_yyyymmdd();
        id_generator.generate("EVT", &date)
    } else {
        event_id
    };

    let event = Event {
        event_id: EventId::new(event_id),
        source_id: item.source_id.clone(),
        raw_id: item.raw_id.clone(),
        tier: item.tier,
        trust_tier: source_config.trust_tier,
        classification_floor: source_config.classification_floor,
        weighting_bias: source_config.weighting_bias,
        event_type,
        title,
        raw_text,
        location_hint,
        facilities: BTreeSet::new(),
        lanes: BTreeSet::new(),
        shipments: BTreeSet::new(),
        link_confidence: LinkConfidence::default(),
        link_provenance: FacilityProvenance::None,
        linking_notes: Vec::new(),
        shipments_total_linked: 0,
        shipments_truncated: false,
        extensions: BTreeMap::new(),
    };

    let projection = EventHashProjection {
        event_type: event.event_type.as_str(),
        title: &event.title,
        raw_text: &event.raw_text,
        location_hint: &event.location_hint,
        trust_tier: event.trust_tier,
        classification_floor: event.classification_floor,
        weighting_bias: event.weighting_bias,
    };
    let hash = hash_canonical_json(HashAlgorithm::Sha256, &projection)?;

    Ok((event, hash))
}
