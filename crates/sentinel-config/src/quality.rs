// crates/sentinel-config/src/quality.rs
// ============================================================================
// Module: Sentinel Alert-Quality Configuration
// Description: YAML alert-quality configuration loading and validation (§6).
// Purpose: Parse quality.yaml into the thresholds the quality validator (C6)
//          needs; recommended defaults per §6 when the document omits them.
// Dependencies: sentinel-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! The alert-quality document is a single flat record of confidence
//! thresholds plus the policy toggle (§4.5 policy A vs B). Unlike source
//! configuration there is no grouping; every field has a recommended
//! default so an operator can ship an empty or partial document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde::Deserialize;

use sentinel_core::ConfigError;
use sentinel_core::quality::QualityConfig;

/// Maximum configuration file size accepted (1 MiB).
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
const CONFIDENCE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;

// ============================================================================
// SECTION: Document
// ============================================================================

/// Alert-quality configuration document (§6).
///
/// Every field defaults to the recommended value from §6 so a document may
/// override only the thresholds an operator actually wants to change.
#[derive(Debug, Clone, Deserialize)]
pub struct QualityDocument {
    /// Minimum facility confidence to reach classification 1 at all.
    #[serde(default = "default_min_confidence_class_1")]
    pub min_confidence_class_1: f64,
    /// Minimum facility confidence to be eligible for classification 2.
    #[serde(default = "default_min_confidence_class_2")]
    pub min_confidence_class_2: f64,
    /// Minimum facility confidence required to clear an ambiguous match.
    #[serde(default = "default_min_confidence_ambiguous")]
    pub min_confidence_ambiguous: f64,
    /// Whether a source's classification floor may override the quality cap.
    #[serde(default = "default_allow_quality_override_floor")]
    pub allow_quality_override_floor: bool,
}

impl Default for QualityDocument {
    fn default() -> Self {
        Self {
            min_confidence_class_1: default_min_confidence_class_1(),
            min_confidence_class_2: default_min_confidence_class_2(),
            min_confidence_ambiguous: default_min_confidence_ambiguous(),
            allow_quality_override_floor: default_allow_quality_override_floor(),
        }
    }
}

const fn default_min_confidence_class_1() -> f64 {
    0.50
}

const fn default_min_confidence_class_2() -> f64 {
    0.70
}

const fn default_min_confidence_ambiguous() -> f64 {
    0.50
}

const fn default_allow_quality_override_floor() -> bool {
    true
}

impl QualityDocument {
    /// Validates that every threshold is a probability in `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] on the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_confidence_class_1", self.min_confidence_class_1),
            ("min_confidence_class_2", self.min_confidence_class_2),
            ("min_confidence_ambiguous", self.min_confidence_ambiguous),
        ] {
            if !CONFIDENCE_RANGE.contains(&value) {
                return Err(ConfigError::InvalidField {
                    field: field.to_string(),
                    reason: "must be a confidence value between 0.0 and 1.0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Projects this document into the core quality validator's config type.
    #[must_use]
    pub const fn to_quality_config(&self) -> QualityConfig {
        QualityConfig {
            min_confidence_class_1: self.min_confidence_class_1,
            min_confidence_class_2: self.min_confidence_class_2,
            min_confidence_ambiguous: self.min_confidence_ambiguous,
            allow_quality_override_floor: self.allow_quality_override_floor,
        }
    }
}

// ============================================================================
// SECTION: Load
// ============================================================================

/// Loads and validates an alert-quality configuration document from `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, is not valid YAML,
/// or a threshold falls outside `[0.0, 1.0]`.
pub fn load_quality_config(path: &Path) -> Result<QualityDocument, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::InvalidField {
            field: "<file>".to_string(),
            reason: "quality config exceeds maximum file size".to_string(),
        });
    }
    let document: QualityDocument = serde_yaml::from_slice(&bytes).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    document.validate()?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recommended_values() {
        let document = QualityDocument::default();
        assert!((document.min_confidence_class_1 - 0.50).abs() < f64::EPSILON);
        assert!((document.min_confidence_class_2 - 0.70).abs() < f64::EPSILON);
        assert!((document.min_confidence_ambiguous - 0.50).abs() < f64::EPSILON);
        assert!(document.allow_quality_override_floor);
    }

    #[test]
    fn parses_partial_document_with_defaults() {
        let document: QualityDocument = serde_yaml::from_str("min_confidence_class_2: 0.80").expect("valid yaml");
        assert!((document.min_confidence_class_2 - 0.80).abs() < f64::EPSILON);
        assert!((document.min_confidence_class_1 - 0.50).abs() < f64::EPSILON);
        document.validate().expect("in range");
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let document: QualityDocument = serde_yaml::from_str("min_confidence_class_1: 1.5").expect("valid yaml");
        assert!(document.validate().is_err());
    }
}
