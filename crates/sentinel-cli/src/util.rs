// crates/sentinel-cli/src/util.rs
// ============================================================================
// Module: Sentinel CLI Argument Parsing Helpers
// Description: Small, shared parsers for CLI-specific argument shapes.
// Purpose: Keep `--since`/`--tier` parsing in one place for ingest and brief.
// Dependencies: sentinel-core
// ============================================================================

//! ## Overview
//! Neither `--since 24h|72h|7d` nor the tier name strings have a natural
//! home in `sentinel-core` (they are CLI-surface conventions, not part of
//! the domain model), so they live here instead.

use sentinel_core::core::raw_item::Tier;

use crate::errors::CliError;

/// Parses a `--since` duration of the form `<N>h` or `<N>d` into hours.
///
/// # Errors
///
/// Returns [`CliError::InvalidSince`] when `value` does not match either
/// form, or the numeric part does not fit a `u32`.
pub fn parse_since_hours(value: &str) -> Result<i64, CliError> {
    let trimmed = value.trim();
    let (digits, hours_per_unit) = if let Some(digits) = trimmed.strip_suffix('h') {
        (digits, 1)
    } else if let Some(digits) = trimmed.strip_suffix('d') {
        (digits, 24)
    } else {
        return Err(CliError::InvalidSince(value.to_string()));
    };
    let magnitude: u32 = digits.parse().map_err(|_err| CliError::InvalidSince(value.to_string()))?;
    Ok(i64::from(magnitude) * hours_per_unit)
}

/// Parses a `--tier` name (`global`, `regional`, `local`; case-insensitive).
///
/// # Errors
///
/// Returns [`CliError::InvalidSince`]-shaped context folded into
/// [`CliError::Input`] when `value` is not one of the three tier names.
pub fn parse_tier(value: &str) -> Result<Tier, CliError> {
    match value.to_ascii_lowercase().as_str() {
        "global" => Ok(Tier::Global),
        "regional" => Ok(Tier::Regional),
        "local" => Ok(Tier::Local),
        other => Err(CliError::Input {
            path: "--tier".to_string(),
            reason: format!("unknown tier `{other}`; expected global, regional, or local"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hour_suffix() {
        assert_eq!(parse_since_hours("24h").expect("valid"), 24);
    }

    #[test]
    fn parses_day_suffix() {
        assert_eq!(parse_since_hours("7d").expect("valid"), 168);
    }

    #[test]
    fn rejects_unknown_suffix() {
        assert!(parse_since_hours("7w").is_err());
    }

    #[test]
    fn rejects_non_numeric_magnitude() {
        assert!(parse_since_hours("xh").is_err());
    }

    #[test]
    fn tier_parsing_is_case_insensitive() {
        assert_eq!(parse_tier("GLOBAL").expect("valid"), Tier::Global);
        assert_eq!(parse_tier("Local").expect("valid"), Tier::Local);
    }

    #[test]
    fn tier_parsing_rejects_unknown_name() {
        assert!(parse_tier("planet").is_err());
    }
}
