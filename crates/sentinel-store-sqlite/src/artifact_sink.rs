// crates/sentinel-store-sqlite/src/artifact_sink.rs
// ============================================================================
// Module: Filesystem Artifact Sink
// Description: Implements ArtifactSink (C9 persistence) over a plain directory.
// Purpose: Write deterministic, content-hashed evidence artifacts to disk.
// Dependencies: sentinel-core, serde_json
// ============================================================================

//! ## Overview
//! [`FsArtifactSink`] writes one canonical-JSON file per incident evidence
//! artifact, named by [`IncidentEvidenceArtifact::filename`]. Because the
//! filename and the canonical-JSON bytes are both pure functions of the
//! artifact's content, writing the same artifact twice reproduces the same
//! bytes at the same path (the trait's idempotence requirement) without any
//! extra bookkeeping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use sentinel_core::core::evidence::IncidentEvidenceArtifact;
use sentinel_core::core::hashing::canonical_json_bytes;
use sentinel_core::errors::StoreError;
use sentinel_core::interfaces::ArtifactSink;

use crate::errors::SqliteStoreError;

// ============================================================================
// SECTION: Fs Artifact Sink
// ============================================================================

/// Writes incident evidence artifacts as canonical-JSON files in a directory.
pub struct FsArtifactSink {
    directory: PathBuf,
}

impl FsArtifactSink {
    /// Builds a sink rooted at `directory`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Io`] when the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, SqliteStoreError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        Ok(Self {
            directory,
        })
    }

    /// Returns the path an artifact would be written to.
    #[must_use]
    pub fn artifact_path(&self, artifact: &IncidentEvidenceArtifact) -> PathBuf {
        self.directory.join(artifact.filename())
    }

    /// Returns the directory this sink writes into.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ArtifactSink for FsArtifactSink {
    fn write_artifact(&self, artifact: &IncidentEvidenceArtifact) -> Result<(), StoreError> {
        self.write_artifact_inner(artifact).map_err(StoreError::from)
    }
}

impl FsArtifactSink {
    fn write_artifact_inner(&self, artifact: &IncidentEvidenceArtifact) -> Result<(), SqliteStoreError> {
        let bytes = canonical_json_bytes(artifact).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let path = self.artifact_path(artifact);
        fs::write(&path, bytes).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sentinel_core::core::alert::CorrelationAction;
    use sentinel_core::core::alert::Diagnostics;
    use sentinel_core::core::alert::EvidenceCorrelation;
    use sentinel_core::core::alert::EvidenceSource;
    use sentinel_core::core::alert::QualityPolicy;
    use sentinel_core::core::alert::QualityValidation;
    use sentinel_core::core::identifiers::AlertId;
    use sentinel_core::core::identifiers::EventId;
    use sentinel_core::core::identifiers::RawItemId;
    use sentinel_core::core::identifiers::SourceId;
    use sentinel_core::core::raw_item::Tier;
    use sentinel_core::core::time::DeterminismContext;
    use sentinel_core::core::time::DeterminismMode;
    use sentinel_core::core::time::Timestamp;

    use super::*;

    fn sample_artifact() -> IncidentEvidenceArtifact {
        IncidentEvidenceArtifact::build(
            AlertId::new("ALERT-1"),
            EventId::new("EVT-1"),
            EvidenceSource {
                id: SourceId::new("SRC-1"),
                tier: Tier::Regional,
                raw_id: RawItemId::new("RAW-1"),
                url: None,
                trust_tier: 2,
            },
            EvidenceCorrelation {
                key: "WEATHER|PLANT-01".into(),
                action: CorrelationAction::Created,
                alert_id: AlertId::new("ALERT-1"),
            },
            Diagnostics {
                link_confidence_facility: 1.0,
                link_confidence_lanes: 0.0,
                link_confidence_shipments: 0.0,
                link_provenance_facility: "PROVIDED".into(),
                shipments_total_linked: 0,
                shipments_truncated: false,
                impact_score: 5,
                impact_score_breakdown: vec!["R1".into()],
                impact_score_rationale: "R1".into(),
                quality_validation: QualityValidation {
                    max_allowed_classification: 2,
                    high_impact_factors_count: 1,
                    facility_confidence: 1.0,
                    facility_provenance: "PROVIDED".into(),
                    applied_policy: QualityPolicy::B,
                },
            },
            "Created new alert".into(),
            vec!["initial correlation".into()],
            Timestamp::from_unix_millis(0),
            DeterminismMode::Pinned,
            Some(DeterminismContext {
                seed: 1,
                timestamp_utc: Timestamp::from_unix_millis(0),
                run_id: "run-1".into(),
            }),
        )
        .expect("buildable artifact")
    }

    #[test]
    fn write_artifact_creates_file_at_derived_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FsArtifactSink::new(dir.path()).expect("sink");
        let artifact = sample_artifact();
        sink.write_artifact(&artifact).expect("write");
        assert!(sink.artifact_path(&artifact).exists());
    }

    #[test]
    fn write_artifact_twice_produces_identical_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FsArtifactSink::new(dir.path()).expect("sink");
        let artifact = sample_artifact();
        sink.write_artifact(&artifact).expect("first write");
        let first = fs::read(sink.artifact_path(&artifact)).expect("read first");
        sink.write_artifact(&artifact).expect("second write");
        let second = fs::read(sink.artifact_path(&artifact)).expect("read second");
        assert_eq!(first, second);
    }
}
