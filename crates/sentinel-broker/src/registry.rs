// crates/sentinel-broker/src/registry.rs
// ============================================================================
// Module: Sentinel Feed Registry
// Description: Scheme-keyed composite source dispatcher.
// Purpose: Resolve a feed URI to raw bytes via the source registered for its
//          scheme, recording the outcome through a sink.
// Dependencies: url, thiserror
// ============================================================================

//! ## Overview
//! [`FeedRegistry`] is the ambient adapter seam §6 describes: a
//! [`crate::source::Source`] registered per URI scheme, composed behind one
//! `fetch` entry point. A concrete fetcher builds one registry at startup
//! (typically `https` → [`crate::source::HttpSource`]) and calls `fetch` once
//! per configured feed URL; the returned bytes are handed to a feed-format
//! adapter (RSS, weather, emergency JSON) that is outside this crate's scope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::sink::FetchOutcome;
use crate::sink::LogSink;
use crate::sink::Sink;
use crate::source::Source;
use crate::source::SourceError;
use crate::source::SourcePayload;

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Errors returned by [`FeedRegistry::fetch`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The URI could not be parsed.
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    /// No source is registered for the URI's scheme.
    #[error("no source registered for scheme: {0}")]
    MissingSource(String),
    /// The registered source failed to resolve the URI.
    #[error("source failure: {0}")]
    Source(#[from] SourceError),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a [`FeedRegistry`].
///
/// # Invariants
/// - Source registrations are keyed by scheme; later registrations overwrite
///   earlier ones for the same scheme.
pub struct FeedRegistryBuilder {
    /// Source registry keyed by URI scheme.
    sources: BTreeMap<String, Arc<dyn Source>>,
    /// Sink used to record fetch outcomes.
    sink: Arc<dyn Sink>,
}

impl Default for FeedRegistryBuilder {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            sink: Arc::new(LogSink::new()),
        }
    }
}

impl FeedRegistryBuilder {
    /// Registers a source for the provided URI scheme.
    #[must_use]
    pub fn source(mut self, scheme: impl Into<String>, source: impl Source + 'static) -> Self {
        self.sources.insert(scheme.into(), Arc::new(source));
        self
    }

    /// Replaces the default [`LogSink`] with a custom sink.
    #[must_use]
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Builds the registry.
    #[must_use]
    pub fn build(self) -> FeedRegistry {
        FeedRegistry {
            sources: self.sources,
            sink: self.sink,
        }
    }
}

// ============================================================================
// SECTION: Feed Registry
// ============================================================================

/// Composite source dispatcher, keyed by URI scheme.
pub struct FeedRegistry {
    /// Source registry keyed by URI scheme.
    sources: BTreeMap<String, Arc<dyn Source>>,
    /// Sink used to record fetch outcomes.
    sink: Arc<dyn Sink>,
}

impl FeedRegistry {
    /// Returns a builder for the registry.
    #[must_use]
    pub fn builder() -> FeedRegistryBuilder {
        FeedRegistryBuilder::default()
    }

    /// Resolves the configured source for `uri`, trying the scheme's base
    /// form (left of a `+`) when an exact match is absent, matching the
    /// `inline+json`/`inline+bytes` compound-scheme convention.
    fn resolve_source(&self, scheme: &str) -> Option<Arc<dyn Source>> {
        if let Some(source) = self.sources.get(scheme) {
            return Some(Arc::clone(source));
        }
        let base = scheme.split_once('+').map_or(scheme, |(base, _)| base);
        self.sources.get(base).map(Arc::clone)
    }

    /// Fetches `uri` through the source registered for its scheme.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUri`] when `uri` cannot be parsed,
    /// [`RegistryError::MissingSource`] when no source is registered for its
    /// scheme, or [`RegistryError::Source`] when the source itself fails.
    pub fn fetch(&self, uri: &str) -> Result<SourcePayload, RegistryError> {
        let scheme = Url::parse(uri)
            .map_err(|err| RegistryError::InvalidUri(err.to_string()))?
            .scheme()
            .to_string();
        let Some(source) = self.resolve_source(&scheme) else {
            return Err(RegistryError::MissingSource(scheme));
        };
        match source.fetch(uri) {
            Ok(payload) => {
                self.sink.record(&FetchOutcome::success(uri, payload.bytes.len()));
                Ok(payload)
            }
            Err(err) => {
                self.sink.record(&FetchOutcome::failure(uri, &err));
                Err(RegistryError::from(err))
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InlineSource;

    #[test]
    fn dispatches_to_registered_scheme() {
        let registry = FeedRegistry::builder().source("inline", InlineSource::new()).build();
        let payload = registry.fetch("inline:hello").expect("resolves");
        assert_eq!(payload.bytes, b"hello");
    }

    #[test]
    fn dispatches_compound_scheme_to_base_registration() {
        let registry = FeedRegistry::builder().source("inline", InlineSource::new()).build();
        let payload = registry.fetch(r#"inline+json:{"a":1}"#).expect("resolves");
        assert_eq!(payload.bytes, br#"{"a":1}"#);
    }

    #[test]
    fn missing_scheme_registration_fails_closed() {
        let registry = FeedRegistry::builder().build();
        let err = registry.fetch("https://example.test/feed").expect_err("no source");
        assert!(matches!(err, RegistryError::MissingSource(scheme) if scheme == "https"));
    }

    #[test]
    fn invalid_uri_is_rejected_before_dispatch() {
        let registry = FeedRegistry::builder().build();
        let err = registry.fetch("not a uri").expect_err("invalid");
        assert!(matches!(err, RegistryError::InvalidUri(_)));
    }
}
