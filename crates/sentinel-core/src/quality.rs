// crates/sentinel-core/src/quality.rs
// ============================================================================
// Module: Sentinel Quality Validator (C6)
// Description: Bound the score-derived classification by evidence quality.
// Purpose: Produce a max-allowed-classification cap and the reasoning behind it.
// Dependencies: regex, crate::core::{event, time}, crate::scorer
// ============================================================================

//! ## Overview
//! The quality validator never raises a classification; it only caps it,
//! based on how confidently the event's facility was resolved and how many
//! independently-observable high-impact factors are present (§4.5). The
//! composition with a source's classification floor (policy A/B) is a
//! separate, deliberately pure step so the ladder stays testable on its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use regex::Regex;

use crate::core::alert::QualityPolicy;
use crate::core::event::Event;
use crate::core::event::FacilityProvenance;
use crate::scorer::ScoreOutcome;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Tunable thresholds for the quality decision ladder (§6 quality config).
#[derive(Debug, Clone, Copy)]
pub struct QualityConfig {
    /// Minimum facility confidence required to reach classification 1 at all.
    pub min_confidence_class_1: f64,
    /// Minimum facility confidence required to be eligible for classification 2.
    pub min_confidence_class_2: f64,
    /// Minimum facility confidence required to clear an ambiguous match.
    pub min_confidence_ambiguous: f64,
    /// Whether a source's classification floor may override the quality cap (policy A).
    pub allow_quality_override_floor: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_confidence_class_1: 0.50,
            min_confidence_class_2: 0.70,
            min_confidence_ambiguous: 0.50,
            allow_quality_override_floor: true,
        }
    }
}

// ============================================================================
// SECTION: High-Impact Keyword Detection
// ============================================================================

const HIGH_IMPACT_KEYWORDS: &[&str] =
    &["SPILL", "LEAK", "STRIKE", "WALKOUT", "CLOSURE", "CLOSED", "SHUTDOWN", "SHUT DOWN", "FIRE", "EXPLOSION"];
const OPERATIONAL_NOUNS: &[&str] = &[
    "PLANT",
    "FACILITY",
    "WAREHOUSE",
    "PORT",
    "TERMINAL",
    "REFINERY",
    "DC",
    "DISTRIBUTION",
    "LOGISTICS",
    "SHIPMENT",
    "LANE",
    "RAIL",
    "TRUCK",
    "CARRIER",
];
/// Idiomatic phrases that would otherwise false-positive the keyword scan.
const FALSE_POSITIVE_PHRASES: &[&str] = &["FIRE SALE", "STRIKE PRICE"];

fn alternation(terms: &[&str]) -> String {
    terms.join("|")
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\b(?:{})\b", alternation(HIGH_IMPACT_KEYWORDS))).expect("static regex is valid")
    })
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn keyword_before_noun_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b(?:{})\b(?:\s+\S+){{0,3}}\s+\b(?:{})\b",
            alternation(HIGH_IMPACT_KEYWORDS),
            alternation(OPERATIONAL_NOUNS)
        ))
        .expect("static regex is valid")
    })
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn noun_before_keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b(?:{})\b(?:\s+\S+){{0,3}}\s+\b(?:{})\b",
            alternation(OPERATIONAL_NOUNS),
            alternation(HIGH_IMPACT_KEYWORDS)
        ))
        .expect("static regex is valid")
    })
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn city_state_upper_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z]+(?:\s+[A-Z]+)*),\s+([A-Z]{2})\b").expect("static regex is valid"))
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn facility_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:PLANT|DC|FACILITY)-[A-Z0-9]+\b").expect("static regex is valid")
    })
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant; a failure here is a programming error")]
fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("static regex is valid"))
}

fn mask_false_positives(text_upper: &str) -> String {
    let mut masked = text_upper.to_string();
    for phrase in FALSE_POSITIVE_PHRASES {
        if let Some(pos) = masked.find(phrase) {
            let replacement = "#".repeat(phrase.len());
            masked.replace_range(pos..pos + phrase.len(), &replacement);
        }
    }
    masked
}

fn has_location_signal(text_upper: &str) -> bool {
    city_state_upper_regex().is_match(text_upper)
        || facility_token_regex().is_match(text_upper)
        || date_regex().is_match(text_upper)
}

/// Returns whether `text_upper` contains a high-impact keyword either near an
/// operational noun or accompanied by a location signal (§4.5).
///
/// Rejects idiomatic false positives like "fire sale" and "strike price".
#[must_use]
pub fn has_high_impact_keyword(text_upper: &str) -> bool {
    let masked = mask_false_positives(text_upper);
    if keyword_before_noun_regex().is_match(&masked) || noun_before_keyword_regex().is_match(&masked) {
        return true;
    }
    keyword_regex().is_match(&masked) && has_location_signal(&masked)
}

fn count_high_impact_factors(event: &Event, score: &ScoreOutcome) -> u8 {
    let mut count = 0u8;
    if score.breakdown.iter().any(|rule| rule.starts_with("R1")) {
        count += 1;
    }
    if score.breakdown.iter().any(|rule| rule.starts_with("R2")) {
        count += 1;
    }
    if score.breakdown.iter().any(|rule| rule.starts_with("R3")) {
        count += 1;
    }
    if has_high_impact_keyword(&event.uppercased_text()) {
        count += 1;
    }
    count
}

// ============================================================================
// SECTION: Quality Outcome
// ============================================================================

/// Result of running the quality decision ladder against a linked, scored event.
#[derive(Debug, Clone)]
pub struct QualityOutcome {
    /// Highest classification the evidence quality justifies, 0-2.
    pub max_allowed_class: u8,
    /// Ordered reasoning trail explaining the cap.
    pub reasoning: Vec<String>,
    /// Count of high-impact factors observed (0-4).
    pub high_impact_factors_count: u8,
    /// Facility link confidence used by the ladder.
    pub facility_confidence: f64,
    /// Facility link provenance tag used by the ladder.
    pub facility_provenance: String,
}

fn outcome(
    max_allowed_class: u8,
    reasoning: Vec<String>,
    high_impact_factors_count: u8,
    facility_confidence: f64,
    facility_provenance: FacilityProvenance,
) -> QualityOutcome {
    QualityOutcome {
        max_allowed_class,
        reasoning,
        high_impact_factors_count,
        facility_confidence,
        facility_provenance: facility_provenance.as_str().to_string(),
    }
}

/// Runs the quality decision ladder (§4.5) for a linked, scored event.
#[must_use]
pub fn validate_quality(event: &Event, score: &ScoreOutcome, config: &QualityConfig) -> QualityOutcome {
    let facility_confidence = event.link_confidence.facility;
    let facility_provenance = event.link_provenance;
    let high_impact_factors_count = count_high_impact_factors(event, score);

    if event.facilities.is_empty() {
        return outcome(
            0,
            vec!["no facilities linked; capping classification at Interesting".to_string()],
            high_impact_factors_count,
            facility_confidence,
            facility_provenance,
        );
    }

    if facility_provenance == FacilityProvenance::CityStateAmbiguous {
        if facility_confidence < config.min_confidence_ambiguous {
            return outcome(
                0,
                vec![format!(
                    "ambiguous facility match below min_confidence_ambiguous ({facility_confidence:.2} < {:.2})",
                    config.min_confidence_ambiguous
                )],
                high_impact_factors_count,
                facility_confidence,
                facility_provenance,
            );
        }
        let mut compensators = 0u8;
        if event.trust_tier == 3 {
            compensators += 1;
        }
        if high_impact_factors_count >= 1 {
            compensators += 1;
        }
        if event.link_confidence.lanes >= 0.70 {
            compensators += 1;
        }
        if event.link_confidence.shipments >= 0.60 {
            compensators += 1;
        }
        if event.facilities.len() > 1 {
            compensators += 1;
        }
        if score.impact_score >= 6 {
            compensators += 1;
        }
        let cap = if compensators >= 2 { 1 } else { 0 };
        return outcome(
            cap,
            vec![format!("ambiguous facility match with {compensators} compensating factor(s); cap={cap}")],
            high_impact_factors_count,
            facility_confidence,
            facility_provenance,
        );
    }

    if facility_confidence >= config.min_confidence_class_2 {
        let cap = if high_impact_factors_count >= 2 || (high_impact_factors_count == 1 && score.impact_score >= 5) {
            2
        } else {
            1
        };
        return outcome(
            cap,
            vec![format!(
                "facility confidence {facility_confidence:.2} clears class-2 threshold; {high_impact_factors_count} high-impact factor(s) observed"
            )],
            high_impact_factors_count,
            facility_confidence,
            facility_provenance,
        );
    }

    if facility_confidence >= config.min_confidence_class_1 {
        let cap = if event.trust_tier >= 2 { 1 } else { 0 };
        return outcome(
            cap,
            vec![format!(
                "facility confidence {facility_confidence:.2} clears class-1 threshold only; trust_tier {}",
                event.trust_tier
            )],
            high_impact_factors_count,
            facility_confidence,
            facility_provenance,
        );
    }

    outcome(
        0,
        vec!["facility confidence below min_confidence_class_1; capping at Interesting".to_string()],
        high_impact_factors_count,
        facility_confidence,
        facility_provenance,
    )
}

// ============================================================================
// SECTION: Compose With Source Floor
// ============================================================================

/// Composes a score-derived classification with the quality cap and a
/// source's classification floor, per the configured policy (§4.5).
///
/// Returns the final classification (0-2), the policy applied, and any
/// additional reasoning the composition itself produced.
#[must_use]
pub fn compose_classification(
    score_class: u8,
    quality: &QualityOutcome,
    floor: u8,
    allow_override_floor: bool,
) -> (u8, QualityPolicy, Vec<String>) {
    let mut reasoning = Vec::new();
    let capped = score_class.min(quality.max_allowed_class);
    if capped < score_class {
        reasoning.push(format!(
            "quality cap reduced classification from {score_class} to {capped}"
        ));
    }

    if allow_override_floor {
        let final_class = capped.max(floor.min(quality.max_allowed_class));
        if final_class > capped {
            reasoning.push(format!(
                "classification floor raised capped classification to {final_class} (never above cap {})",
                quality.max_allowed_class
            ));
        }
        (final_class, QualityPolicy::B, reasoning)
    } else {
        let final_class = capped.max(floor);
        if floor > quality.max_allowed_class {
            reasoning.push(format!(
                "classification floor {floor} overrides quality cap {} (policy A)",
                quality.max_allowed_class
            ));
        }
        (final_class, QualityPolicy::A, reasoning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fire_sale_false_positive() {
        assert!(!has_high_impact_keyword("FIRE SALE AT WAREHOUSE"));
    }

    #[test]
    fn rejects_strike_price_false_positive() {
        assert!(!has_high_impact_keyword("STRIKE PRICE RALLY CONTINUES"));
    }

    #[test]
    fn detects_keyword_near_operational_noun() {
        assert!(has_high_impact_keyword("CHEMICAL SPILL REPORTED AT THE PLANT"));
    }

    #[test]
    fn detects_keyword_with_location_signal_alone() {
        assert!(has_high_impact_keyword("STRIKE CALLED FOR AUSTIN, TX STARTING MONDAY"));
        assert!(!has_high_impact_keyword("STRIKE CALLED WITH NO OPERATIONAL DETAILS"));
    }

    #[test]
    fn compose_policy_b_never_raises_above_cap() {
        let quality = QualityOutcome {
            max_allowed_class: 0,
            reasoning: vec![],
            high_impact_factors_count: 0,
            facility_confidence: 0.0,
            facility_provenance: FacilityProvenance::None.as_str().to_string(),
        };
        let (final_class, policy, _) = compose_classification(2, &quality, 2, true);
        assert_eq!(final_class, 0);
        assert_eq!(policy, QualityPolicy::B);
    }

    #[test]
    fn compose_policy_a_lets_floor_exceed_cap() {
        let quality = QualityOutcome {
            max_allowed_class: 0,
            reasoning: vec![],
            high_impact_factors_count: 0,
            facility_confidence: 0.0,
            facility_provenance: FacilityProvenance::None.as_str().to_string(),
        };
        let (final_class, policy, _) = compose_classification(0, &quality, 2, false);
        assert_eq!(final_class, 2);
        assert_eq!(policy, QualityPolicy::A);
    }
}
