// crates/sentinel-broker/src/source/inline.rs
// ============================================================================
// Module: Sentinel Inline Source
// Description: Inline payload source for literal, embedded feed content.
// Purpose: Let tests and fixtures register feed bytes without a network fetch.
// Dependencies: (none)
// ============================================================================

//! ## Overview
//! [`InlineSource`] resolves `inline:` URIs whose content is the literal
//! text following the prefix. It exists so integration tests can exercise
//! [`crate::registry::FeedRegistry`] dispatch without standing up an HTTP
//! fixture server.
//!
//! Supported prefixes: `inline+json:`, `inline+bytes:`, and `inline:`. The
//! distinction only affects the reported content type; the bytes are taken
//! verbatim in all three cases.

use crate::source::Source;
use crate::source::SourceError;
use crate::source::SourcePayload;
use crate::source::enforce_max_bytes;

/// Inline payload source carrying literal text.
///
/// # Invariants
/// - Payloads are capped at [`crate::source::MAX_SOURCE_BYTES`].
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSource;

impl InlineSource {
    /// Creates a new inline source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Source for InlineSource {
    fn fetch(&self, uri: &str) -> Result<SourcePayload, SourceError> {
        if let Some(literal) = uri.strip_prefix("inline+json:") {
            enforce_max_bytes(literal.len())?;
            return Ok(SourcePayload {
                bytes: literal.as_bytes().to_vec(),
                content_type: Some("application/json".to_string()),
            });
        }
        if let Some(literal) = uri.strip_prefix("inline+bytes:") {
            enforce_max_bytes(literal.len())?;
            return Ok(SourcePayload {
                bytes: literal.as_bytes().to_vec(),
                content_type: Some("application/octet-stream".to_string()),
            });
        }
        if let Some(literal) = uri.strip_prefix("inline:") {
            enforce_max_bytes(literal.len())?;
            return Ok(SourcePayload {
                bytes: literal.as_bytes().to_vec(),
                content_type: None,
            });
        }
        Err(SourceError::UnsupportedScheme("inline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_prefixed_literal() {
        let source = InlineSource::new();
        let payload = source.fetch(r#"inline+json:{"ok":true}"#).expect("resolves");
        assert_eq!(payload.bytes, br#"{"ok":true}"#);
        assert_eq!(payload.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn decodes_plain_literal_with_no_content_type() {
        let source = InlineSource::new();
        let payload = source.fetch("inline:hello world").expect("resolves");
        assert_eq!(payload.bytes, b"hello world");
        assert_eq!(payload.content_type, None);
    }

    #[test]
    fn rejects_unrecognized_scheme() {
        let source = InlineSource::new();
        let err = source.fetch("https://example.test/feed").expect_err("rejected");
        assert!(matches!(err, SourceError::UnsupportedScheme(_)));
    }
}
