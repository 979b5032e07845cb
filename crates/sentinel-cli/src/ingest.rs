// crates/sentinel-cli/src/ingest.rs
// ============================================================================
// Module: Sentinel CLI Ingest Command
// Description: Wires a batch of already-parsed raw item candidates through
//              staging (C1/C2) and the orchestrator (C10).
// Purpose: Thin CLI surface over `sentinel-core`'s ingest pipeline (§6, A5).
// Dependencies: clap, sentinel-config, sentinel-core, sentinel-store-sqlite
// ============================================================================

//! ## Overview
//! Per §1/§6, concrete feed adapters are an external collaborator this
//! workspace does not ship; `sentinel ingest` instead reads a JSON file of
//! already-parsed [`RawItemCandidate`] values (what a future fetcher adapter
//! would otherwise stage directly) and drives them through [`Orchestrator::ingest`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use sentinel_config::load_quality_config;
use sentinel_config::load_source_config;
use sentinel_core::core::idgen::IdGenerator;
use sentinel_core::core::idgen::LiveIdGenerator;
use sentinel_core::core::idgen::PinnedIdGenerator;
use sentinel_core::core::identifiers::SourceId;
use sentinel_core::core::raw_item::RawItemCandidate;
use sentinel_core::core::raw_item::Tier;
use sentinel_core::core::time::Clock;
use sentinel_core::core::time::DeterminismContext;
use sentinel_core::core::time::DeterminismMode;
use sentinel_core::core::time::PinnedClock;
use sentinel_core::core::time::SystemClock;
use sentinel_core::core::time::Timestamp;
use sentinel_core::linker::LinkerConfig;
use sentinel_core::orchestrator::IngestReport;
use sentinel_core::orchestrator::IngestRequest;
use sentinel_core::orchestrator::Orchestrator;
use serde::Deserialize;
use sentinel_store_sqlite::FsArtifactSink;
use sentinel_store_sqlite::SqliteStore;
use sentinel_store_sqlite::SqliteStoreConfig;
use sentinel_store_sqlite::load_facilities_csv;
use sentinel_store_sqlite::load_lanes_csv;
use sentinel_store_sqlite::load_shipments_csv;

use crate::errors::CliError;
use crate::util::parse_since_hours;
use crate::util::parse_tier;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// `sentinel ingest` arguments (§6: `ingest [--limit N] [--tier T] [--source S] [--since ...]`).
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path to the `SQLite` database file (created if absent).
    #[arg(long, value_name = "PATH")]
    pub db: PathBuf,
    /// Path to the source configuration YAML document (§6).
    #[arg(long, value_name = "PATH")]
    pub sources: PathBuf,
    /// Path to the alert-quality configuration YAML document (§6); defaults
    /// to the recommended thresholds when omitted.
    #[arg(long, value_name = "PATH")]
    pub quality: Option<PathBuf>,
    /// Path to a JSON file of already-parsed raw item candidates to stage.
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,
    /// Directory incident evidence artifacts are written to.
    #[arg(long, value_name = "DIR")]
    pub evidence_dir: PathBuf,
    /// Optional facilities CSV fixture to (re-)load before ingesting (A3).
    #[arg(long, value_name = "PATH")]
    pub facilities_csv: Option<PathBuf>,
    /// Optional lanes CSV fixture to (re-)load before ingesting (A3).
    #[arg(long, value_name = "PATH")]
    pub lanes_csv: Option<PathBuf>,
    /// Optional shipments CSV fixture to (re-)load before ingesting (A3).
    #[arg(long, value_name = "PATH")]
    pub shipments_csv: Option<PathBuf>,
    /// Maximum number of staged raw items to process this run.
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
    /// Only process items whose source tier admits this floor (`global`/`regional`/`local`).
    #[arg(long, value_name = "TIER")]
    pub tier: Option<String>,
    /// Restrict processing to a single configured source id.
    #[arg(long, value_name = "SOURCE_ID")]
    pub source: Option<String>,
    /// Only process items fetched within this window, e.g. `24h`, `72h`, `7d`.
    #[arg(long, value_name = "WINDOW")]
    pub since: Option<String>,
    /// Seed for pinned (deterministic replay) mode; requires `--pinned-timestamp` and `--pinned-run-id`.
    #[arg(long, value_name = "SEED")]
    pub pinned_seed: Option<u64>,
    /// RFC 3339 timestamp every clock read returns in pinned mode.
    #[arg(long, value_name = "RFC3339")]
    pub pinned_timestamp: Option<String>,
    /// Run id recorded in evidence artifacts in pinned mode.
    #[arg(long, value_name = "RUN_ID")]
    pub pinned_run_id: Option<String>,
}

// ============================================================================
// SECTION: Input Shape
// ============================================================================

/// One entry in the `--input` JSON file: a candidate plus its source.
///
/// This is the shape a future feed adapter would hand to [`SqliteStore::stage_raw_item`]
/// directly; the CLI reads it from a file only because no concrete adapter ships (§1).
#[derive(Debug, Deserialize)]
struct IngestInputItem {
    /// Id of the source this candidate was fetched from; must appear in `--sources`.
    source_id: String,
    /// UTC fetch timestamp, RFC 3339; defaults to the active clock's `now()`.
    #[serde(default)]
    fetched_at_utc: Option<String>,
    /// The candidate itself.
    candidate: RawItemCandidate,
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Executes `sentinel ingest`.
///
/// # Errors
///
/// Returns [`CliError`] when configuration fails to load, the database
/// cannot be opened, or the input file is missing or malformed. A per-item
/// canonicalization failure is not an error here: it is reflected in the
/// returned [`IngestReport::errors`] per §4.8/§7.
pub fn run(args: &IngestArgs) -> Result<IngestReport, CliError> {
    let source_document = load_source_config(&args.sources)?;
    let source_configs = source_document.into_source_configs();
    let tier_by_source = tier_lookup(&source_document);

    let quality_config = match &args.quality {
        Some(path) => load_quality_config(path)?.to_quality_config(),
        None => sentinel_core::quality::QualityConfig::default(),
    };

    let store = SqliteStore::new(SqliteStoreConfig::new(args.db.clone()))?;
    let artifact_sink = FsArtifactSink::new(args.evidence_dir.clone())?;

    if let Some(path) = &args.facilities_csv {
        load_facilities_csv(&store, path)?;
    }
    if let Some(path) = &args.lanes_csv {
        load_lanes_csv(&store, path)?;
    }
    if let Some(path) = &args.shipments_csv {
        load_shipments_csv(&store, path)?;
    }

    let mut determinism = PinnedOrLive::resolve(args)?;
    let (clock, id_generator, context, mode) = determinism.parts();
    let context = context.clone();

    let items = read_input_items(&args.input)?;
    for item in &items {
        let source_id = SourceId::new(item.source_id.clone());
        let tier = tier_by_source.get(&item.source_id).copied().unwrap_or(Tier::Local);
        let fetched_at = match &item.fetched_at_utc {
            Some(value) => Timestamp::parse_rfc3339(value).map_err(|err| CliError::Input {
                path: args.input.display().to_string(),
                reason: format!("invalid fetched_at_utc `{value}`: {err}"),
            })?,
            None => clock.now(),
        };
        let date_yyyymmdd = fetched_at.to_yyyymmdd();
        store.stage_raw_item(&item.candidate, &source_id, tier, fetched_at, id_generator, &date_yyyymmdd)?;
    }

    let min_tier = args.tier.as_deref().map(parse_tier).transpose()?;
    let since_hours = args.since.as_deref().map(parse_since_hours).transpose()?;
    let request = IngestRequest {
        limit: args.limit,
        min_tier,
        source_id: args.source.as_deref().map(|s| SourceId::new(s.to_string())),
        since_hours,
    };

    let orchestrator = Orchestrator::new(
        &store,
        &store,
        &store,
        &artifact_sink,
        &store,
        clock,
        &source_configs,
        LinkerConfig::default(),
        quality_config,
        context,
        mode,
    );

    let report = orchestrator.ingest(&request, id_generator)?;
    tracing::info!(
        processed = report.processed,
        events = report.events,
        alerts = report.alerts,
        errors = report.errors,
        "ingest run complete"
    );
    Ok(report)
}

/// Builds a map from configured source id to its declared tier (§6 schema;
/// not preserved by [`sentinel_config::SourceDocument::into_source_configs`],
/// which only carries the canonicalizer-facing trust fields).
fn tier_lookup(document: &sentinel_config::SourceDocument) -> BTreeMap<String, Tier> {
    let mut map = BTreeMap::new();
    for entry in &document.tiers.global {
        map.insert(entry.id.clone(), entry.tier);
    }
    for entry in &document.tiers.regional {
        map.insert(entry.id.clone(), entry.tier);
    }
    for entry in &document.tiers.local {
        map.insert(entry.id.clone(), entry.tier);
    }
    map
}

/// Reads and parses the `--input` JSON file.
fn read_input_items(path: &std::path::Path) -> Result<Vec<IngestInputItem>, CliError> {
    let bytes = fs::read(path).map_err(|err| CliError::Input {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| CliError::Input {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

// ============================================================================
// SECTION: Determinism Selection
// ============================================================================

/// The clock/id-generator/context triple for one run, selected by whether
/// `--pinned-*` arguments were supplied (§4.9).
enum PinnedOrLive {
    /// Live mode: wall clock, randomized ids.
    Live {
        /// Wall clock reader.
        clock: SystemClock,
        /// Randomized id allocator.
        id_generator: LiveIdGenerator,
        /// Context recorded on evidence artifacts even in live mode.
        context: DeterminismContext,
    },
    /// Pinned mode: fixed clock, seeded ids (§4.9, replayable).
    Pinned {
        /// Clock fixed at the pinned timestamp.
        clock: PinnedClock,
        /// Seeded id allocator.
        id_generator: PinnedIdGenerator,
        /// The pinned context itself.
        context: DeterminismContext,
    },
}

impl PinnedOrLive {
    /// Resolves the active determinism mode from `--pinned-*` CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Input`] when only some of the three `--pinned-*`
    /// arguments were supplied, or `--pinned-timestamp` is not valid RFC 3339.
    fn resolve(args: &IngestArgs) -> Result<Self, CliError> {
        match (args.pinned_seed, &args.pinned_timestamp, &args.pinned_run_id) {
            (None, None, None) => {
                let clock = SystemClock;
                let now = clock.now();
                let context = DeterminismContext {
                    seed: 0,
                    timestamp_utc: now,
                    run_id: format!("live-{}", now.to_rfc3339()),
                };
                Ok(Self::Live {
                    clock,
                    id_generator: LiveIdGenerator,
                    context,
                })
            }
            (Some(seed), Some(timestamp), Some(run_id)) => {
                let timestamp_utc = Timestamp::parse_rfc3339(timestamp).map_err(|err| CliError::Input {
                    path: "--pinned-timestamp".to_string(),
                    reason: err.to_string(),
                })?;
                let context = DeterminismContext {
                    seed,
                    timestamp_utc,
                    run_id: run_id.clone(),
                };
                Ok(Self::Pinned {
                    clock: PinnedClock::new(timestamp_utc),
                    id_generator: PinnedIdGenerator::new(seed),
                    context,
                })
            }
            _ => Err(CliError::Input {
                path: "--pinned-seed/--pinned-timestamp/--pinned-run-id".to_string(),
                reason: "all three pinned arguments must be supplied together, or none of them".to_string(),
            }),
        }
    }

    /// Splits into its clock, id generator, context, and mode, as disjoint
    /// borrows of one value.
    ///
    /// A single match gives the caller a live `&mut dyn IdGenerator`
    /// alongside a `&dyn Clock` from the same call; two separate accessor
    /// methods would each have to borrow the whole enum and could not be
    /// held at once.
    fn parts(&mut self) -> (&dyn Clock, &mut dyn IdGenerator, &DeterminismContext, DeterminismMode) {
        match self {
            Self::Live {
                clock,
                id_generator,
                context,
            } => (&*clock, id_generator, context, DeterminismMode::Live),
            Self::Pinned {
                clock,
                id_generator,
                context,
            } => (&*clock, id_generator, context, DeterminismMode::Pinned),
        }
    }
}
