// crates/sentinel-config/src/source.rs
// ============================================================================
// Module: Sentinel Source Configuration
// Description: YAML feed/source configuration loading and validation (§6).
// Purpose: Parse source-config.yaml into the per-source metadata the
//          canonicalizer (C3) needs, grouped by trust tier.
// Dependencies: sentinel-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! Source configuration groups feed entries by tier (`global`, `regional`,
//! `local`) and carries per-entry trust metadata the canonicalizer injects
//! verbatim into every [`sentinel_core::core::event::Event`] it produces.
//! Loading never touches the network; it only parses and validates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use sentinel_core::ConfigError;
use sentinel_core::canonicalize::GeoHint;
use sentinel_core::canonicalize::SourceConfig;
use sentinel_core::core::identifiers::SourceId;
use sentinel_core::core::raw_item::Tier;

/// Maximum configuration file size accepted (1 MiB).
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Valid range for `trust_tier`.
const TRUST_TIER_RANGE: std::ops::RangeInclusive<u8> = 1..=3;
/// Valid range for `classification_floor`.
const CLASSIFICATION_FLOOR_RANGE: std::ops::RangeInclusive<u8> = 0..=2;

// ============================================================================
// SECTION: Document
// ============================================================================

/// Top-level source configuration document (§6 source configuration schema).
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDocument {
    /// Schema version tag, informational only.
    pub version: String,
    /// Defaults applied to fetchers; not consumed by the core pipeline.
    #[serde(default)]
    pub defaults: SourceDefaults,
    /// Feed entries grouped by trust tier.
    #[serde(default)]
    pub tiers: TierSources,
}

/// Fetcher-facing defaults carried alongside the source list.
///
/// None of these fields are read by the core pipeline; they exist so a
/// future fetcher adapter (§6 adapter contract) has one place to find them.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefaults {
    /// Per-host and jitter rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Fetch timeout, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,
    /// User-Agent string fetchers should send.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum items a single fetch call may return.
    #[serde(default = "default_max_items_per_fetch")]
    pub max_items_per_fetch: u32,
}

impl Default for SourceDefaults {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
            max_items_per_fetch: default_max_items_per_fetch(),
        }
    }
}

const fn default_timeout_seconds() -> u32 {
    30
}

fn default_user_agent() -> String {
    "sentinel-ingest/0.1".to_string()
}

const fn default_max_items_per_fetch() -> u32 {
    100
}

/// Per-host rate limiting for fetchers.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum seconds between requests to the same host.
    #[serde(default = "default_per_host_min_seconds")]
    pub per_host_min_seconds: u32,
    /// Random jitter added on top of the minimum interval.
    #[serde(default)]
    pub jitter_seconds: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_host_min_seconds: default_per_host_min_seconds(),
            jitter_seconds: 0,
        }
    }
}

const fn default_per_host_min_seconds() -> u32 {
    5
}

/// Feed entries grouped by trust tier.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TierSources {
    /// Global-tier feeds.
    #[serde(default)]
    pub global: Vec<SourceEntry>,
    /// Regional-tier feeds.
    #[serde(default)]
    pub regional: Vec<SourceEntry>,
    /// Local-tier feeds.
    #[serde(default)]
    pub local: Vec<SourceEntry>,
}

impl TierSources {
    /// Iterates every entry across all three tiers, paired with its group tier.
    fn entries_with_group(&self) -> impl Iterator<Item = (Tier, &SourceEntry)> {
        self.global
            .iter()
            .map(|entry| (Tier::Global, entry))
            .chain(self.regional.iter().map(|entry| (Tier::Regional, entry)))
            .chain(self.local.iter().map(|entry| (Tier::Local, entry)))
    }
}

/// Geo hint attached to a source entry (§4.2 step 2).
#[derive(Debug, Clone, Deserialize)]
pub struct GeoConfig {
    /// Configured city.
    #[serde(default)]
    pub city: Option<String>,
    /// Configured state.
    #[serde(default)]
    pub state: Option<String>,
    /// Configured country.
    #[serde(default)]
    pub country: Option<String>,
}

/// One configured feed (§6 source configuration schema).
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    /// Stable source identifier.
    pub id: String,
    /// Adapter type tag (e.g. `"rss"`, `"weather"`, `"emergency_json"`).
    #[serde(rename = "type")]
    pub source_type: String,
    /// Feed URL; not dereferenced by this crate.
    pub url: String,
    /// Trust tier this entry belongs to; must match its group.
    pub tier: Tier,
    /// Whether this source is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Source trustworthiness modifier, 1-3.
    #[serde(default = "default_trust_tier")]
    pub trust_tier: u8,
    /// Minimum classification this source demands, 0-2.
    #[serde(default)]
    pub classification_floor: u8,
    /// Small signed scoring adjustment.
    #[serde(default)]
    pub weighting_bias: i32,
    /// Optional geo hint for location extraction.
    #[serde(default)]
    pub geo: Option<GeoConfig>,
}

const fn default_enabled() -> bool {
    true
}

const fn default_trust_tier() -> u8 {
    2
}

// ============================================================================
// SECTION: Load
// ============================================================================

/// Loads and validates a source configuration document from `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, is not valid YAML,
/// or fails validation.
pub fn load_source_config(path: &Path) -> Result<SourceDocument, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::InvalidField {
            field: "<file>".to_string(),
            reason: "source config exceeds maximum file size".to_string(),
        });
    }
    let document: SourceDocument = serde_yaml::from_slice(&bytes).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    document.validate()?;
    Ok(document)
}

impl SourceDocument {
    /// Validates internal consistency of the document (§6).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] on the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "version".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let mut seen_ids: BTreeMap<&str, ()> = BTreeMap::new();
        for (group_tier, entry) in self.tiers.entries_with_group() {
            entry.validate(group_tier)?;
            if seen_ids.insert(entry.id.as_str(), ()).is_some() {
                return Err(ConfigError::InvalidField {
                    field: format!("tiers.{group_tier:?}.id"),
                    reason: format!("duplicate source id `{}`", entry.id),
                });
            }
        }
        Ok(())
    }

    /// Projects every enabled entry into the core canonicalizer's source
    /// config map, keyed by source id.
    #[must_use]
    pub fn into_source_configs(&self) -> BTreeMap<SourceId, SourceConfig> {
        self.tiers
            .entries_with_group()
            .filter(|(_, entry)| entry.enabled)
            .map(|(_, entry)| (SourceId::new(entry.id.clone()), entry.to_core_config()))
            .collect()
    }
}

impl SourceEntry {
    /// Validates one entry, given the tier group it was declared under.
    fn validate(&self, group_tier: Tier) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "tiers[].id".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.url.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: format!("tiers[].{}.url", self.id),
                reason: "must not be empty".to_string(),
            });
        }
        if self.tier != group_tier {
            return Err(ConfigError::InvalidField {
                field: format!("tiers[].{}.tier", self.id),
                reason: format!("declared tier does not match its group ({group_tier:?})"),
            });
        }
        if !TRUST_TIER_RANGE.contains(&self.trust_tier) {
            return Err(ConfigError::InvalidField {
                field: format!("tiers[].{}.trust_tier", self.id),
                reason: "must be 1, 2, or 3".to_string(),
            });
        }
        if !CLASSIFICATION_FLOOR_RANGE.contains(&self.classification_floor) {
            return Err(ConfigError::InvalidField {
                field: format!("tiers[].{}.classification_floor", self.id),
                reason: "must be 0, 1, or 2".to_string(),
            });
        }
        Ok(())
    }

    /// Projects this entry into the core canonicalizer's per-source config.
    fn to_core_config(&self) -> SourceConfig {
        SourceConfig {
            trust_tier: self.trust_tier,
            classification_floor: self.classification_floor,
            weighting_bias: self.weighting_bias,
            geo: self.geo.as_ref().map(|geo| GeoHint {
                city: geo.city.clone(),
                state: geo.state.clone(),
                country: geo.country.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
version: '1'
tiers:
  global:
    - id: SRC-GDACS
      type: emergency_json
      url: https://example.test/gdacs
      tier: global
      trust_tier: 3
  regional:
    - id: SRC-NWS-TX
      type: weather
      url: https://example.test/nws-tx
      tier: regional
      geo:
        city: Houston
        state: TX
";

    #[test]
    fn parses_and_validates_sample_document() {
        let document: SourceDocument = serde_yaml::from_str(SAMPLE).expect("valid yaml");
        document.validate().expect("valid document");
        assert_eq!(document.tiers.global.len(), 1);
        assert_eq!(document.tiers.regional.len(), 1);
    }

    #[test]
    fn into_source_configs_carries_geo_hint() {
        let document: SourceDocument = serde_yaml::from_str(SAMPLE).expect("valid yaml");
        let configs = document.into_source_configs();
        let nws = configs.get(&SourceId::new("SRC-NWS-TX")).expect("present");
        assert_eq!(nws.geo.as_ref().and_then(|geo| geo.city.clone()).as_deref(), Some("Houston"));
    }

    #[test]
    fn rejects_tier_mismatch() {
        let yaml = r"
version: '1'
tiers:
  global:
    - id: SRC-X
      type: rss
      url: https://example.test/x
      tier: local
";
        let document: SourceDocument = serde_yaml::from_str(yaml).expect("valid yaml");
        assert!(document.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_ids_across_tiers() {
        let yaml = r"
version: '1'
tiers:
  global:
    - id: SRC-X
      type: rss
      url: https://example.test/x
      tier: global
  regional:
    - id: SRC-X
      type: rss
      url: https://example.test/y
      tier: regional
";
        let document: SourceDocument = serde_yaml::from_str(yaml).expect("valid yaml");
        assert!(document.validate().is_err());
    }
}
