// crates/sentinel-cli/src/brief.rs
// ============================================================================
// Module: Sentinel CLI Daily Brief Renderer
// Description: Markdown/JSON summary of recently-seen alerts (A4).
// Purpose: Give an operator a quick read of what the last ingest window
//          produced without opening the database directly.
// Dependencies: clap, sentinel-core, sentinel-store-sqlite, serde_json
// ============================================================================

//! ## Overview
//! `sentinel brief` is a read-only view over [`AlertStore::list_recent_alerts`];
//! it never mutates the store. Class-0 (`Interesting`) alerts are omitted by
//! default since they rarely warrant a human's attention in a daily digest;
//! `--include-class0` opts back in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use clap::Args;
use clap::ValueEnum;
use sentinel_core::core::alert::Alert;
use sentinel_core::core::alert::Classification;
use sentinel_core::core::time::Clock;
use sentinel_core::core::time::SystemClock;
use sentinel_core::interfaces::AlertStore;
use sentinel_store_sqlite::SqliteStore;
use sentinel_store_sqlite::SqliteStoreConfig;

use crate::errors::CliError;
use crate::util::parse_since_hours;

/// Hours considered "today" for `--today` (one calendar day).
const TODAY_HOURS: i64 = 24;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Output format for `sentinel brief` (§6).
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefFormat {
    /// Human-readable markdown digest.
    Md,
    /// Machine-readable JSON array of alerts.
    Json,
}

/// `sentinel brief` arguments (§6: `brief --today [--since ...] [--format md|json] [--limit N] [--include-class0]`).
#[derive(Args, Debug)]
pub struct BriefArgs {
    /// Path to the `SQLite` database file.
    #[arg(long, value_name = "PATH")]
    pub db: PathBuf,
    /// Restrict to alerts seen within the last 24 hours; shorthand for `--since 24h`.
    #[arg(long)]
    pub today: bool,
    /// Restrict to alerts seen within this window, e.g. `24h`, `72h`, `7d`.
    #[arg(long, value_name = "WINDOW")]
    pub since: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = BriefFormat::Md)]
    pub format: BriefFormat,
    /// Maximum number of alerts to render.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
    /// Include class-0 (`Interesting`) alerts, omitted by default.
    #[arg(long)]
    pub include_class0: bool,
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Executes `sentinel brief`, returning the rendered digest.
///
/// # Errors
///
/// Returns [`CliError`] when the database cannot be opened or queried, or
/// `--since` does not parse.
pub fn run(args: &BriefArgs) -> Result<String, CliError> {
    let since_hours = match (&args.since, args.today) {
        (Some(value), _) => parse_since_hours(value)?,
        (None, true) => TODAY_HOURS,
        (None, false) => TODAY_HOURS,
    };

    let store = SqliteStore::new(SqliteStoreConfig::new(args.db.clone()))?;
    let clock = SystemClock;
    let now = clock.now();

    let mut alerts = store.list_recent_alerts(since_hours, now)?;
    if !args.include_class0 {
        alerts.retain(|alert| alert.classification != Classification::Interesting);
    }
    alerts.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
    alerts.truncate(args.limit);

    Ok(match args.format {
        BriefFormat::Md => render_markdown(&alerts, since_hours),
        BriefFormat::Json => render_json(&alerts)?,
    })
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the markdown digest (§A4).
fn render_markdown(alerts: &[Alert], since_hours: i64) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Daily Brief (last {since_hours}h)\n\n"));
    if alerts.is_empty() {
        out.push_str("No alerts in this window.\n");
        return out;
    }
    for alert in alerts {
        out.push_str(&format!(
            "## {} — {} (class {})\n",
            alert.alert_id.as_str(),
            alert.risk_type,
            alert.classification.as_u8()
        ));
        out.push_str(&format!("- Summary: {}\n", alert.summary));
        out.push_str(&format!("- Status: {}\n", alert.status.as_str()));
        out.push_str(&format!("- Impact score: {}\n", alert.impact_score));
        out.push_str(&format!(
            "- Facilities: {}\n",
            join_ids(alert.scope.facilities.iter().map(|id| id.as_str()))
        ));
        out.push_str(&format!(
            "- Lanes: {}\n",
            join_ids(alert.scope.lanes.iter().map(|id| id.as_str()))
        ));
        out.push_str(&format!("- First seen: {}\n", alert.first_seen));
        out.push_str(&format!("- Last seen: {}\n", alert.last_seen));
        out.push_str(&format!("- Updates: {}\n\n", alert.update_count));
    }
    out
}

/// Joins an iterator of id strings for a single markdown line.
fn join_ids<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = ids.collect();
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined.join(", ")
    }
}

/// Renders the JSON digest.
///
/// # Errors
///
/// Returns [`CliError::Input`] when serialization fails (unexpected: every
/// field is already serializable).
fn render_json(alerts: &[Alert]) -> Result<String, CliError> {
    serde_json::to_string_pretty(alerts).map_err(|err| CliError::Input {
        path: "<brief output>".to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use sentinel_core::core::alert::AlertImpactAssessment;
    use sentinel_core::core::alert::AlertScope;
    use sentinel_core::core::alert::AlertStatus;
    use sentinel_core::core::alert::CorrelationAction;
    use sentinel_core::core::alert::Diagnostics;
    use sentinel_core::core::alert::QualityPolicy;
    use sentinel_core::core::alert::QualityValidation;
    use sentinel_core::core::identifiers::AlertId;
    use sentinel_core::core::identifiers::EventId;
    use sentinel_core::core::raw_item::Tier;
    use sentinel_core::core::time::Timestamp;

    use super::*;

    fn sample_alert(classification: Classification) -> Alert {
        Alert {
            alert_id: AlertId::new("ALERT-1"),
            risk_type: "SPILL".to_string(),
            classification,
            status: AlertStatus::Open,
            summary: "Chemical spill at PLANT-01".to_string(),
            root_event_id: EventId::new("EVT-1"),
            correlation_key: "SPILL|PLANT-01".to_string(),
            scope: AlertScope::default(),
            impact_assessment: AlertImpactAssessment::default(),
            recommended_actions: Vec::new(),
            reasoning: Vec::new(),
            impact_score: 5,
            diagnostics: Diagnostics {
                link_confidence_facility: 1.0,
                link_confidence_lanes: 0.0,
                link_confidence_shipments: 0.0,
                link_provenance_facility: "FACILITY_ID_EXACT".to_string(),
                shipments_total_linked: 0,
                shipments_truncated: false,
                impact_score: 5,
                impact_score_breakdown: vec!["R1".to_string()],
                impact_score_rationale: "R1".to_string(),
                quality_validation: QualityValidation {
                    max_allowed_classification: 2,
                    high_impact_factors_count: 2,
                    facility_confidence: 1.0,
                    facility_provenance: "FACILITY_ID_EXACT".to_string(),
                    applied_policy: QualityPolicy::B,
                },
            },
            first_seen: Timestamp::from_unix_millis(0),
            last_seen: Timestamp::from_unix_millis(0),
            update_count: 1,
            tier: Tier::Regional,
            source_id: None,
            trust_tier: 2,
            correlation_action: CorrelationAction::Created,
            incident_evidence_path: "ALERT-1.json".to_string(),
            incident_evidence_hash: "deadbeef".to_string(),
        }
    }

    #[test]
    fn markdown_digest_lists_alert_summary() {
        let alerts = vec![sample_alert(Classification::Impactful)];
        let rendered = render_markdown(&alerts, 24);
        assert!(rendered.contains("ALERT-1"));
        assert!(rendered.contains("Chemical spill at PLANT-01"));
    }

    #[test]
    fn markdown_digest_reports_empty_window() {
        let rendered = render_markdown(&[], 24);
        assert!(rendered.contains("No alerts"));
    }

    #[test]
    fn json_digest_round_trips_through_serde() {
        let alerts = vec![sample_alert(Classification::Relevant)];
        let rendered = render_json(&alerts).expect("serializes");
        let parsed: Vec<Alert> = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].alert_id.as_str(), "ALERT-1");
    }
}
