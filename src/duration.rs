// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TTL specification parsing.
//!
//! Accepts a bare number of seconds (`"3600"`) or a number followed by a single
//! unit (`"90s"`, `"30m"`, `"1h"`, `"2d"`, `"1w"`) and converts it to a TTL in
//! seconds, bounded by the RFC 2181 maximum.

use crate::constants::MAX_RECORD_TTL_SECS;
use crate::errors::ConfigError;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;
const SECONDS_PER_WEEK: u64 = 604_800;

/// Parse a TTL specification into seconds.
///
/// # Examples
///
/// ```
/// use ddns_sync::duration::parse_ttl;
///
/// assert_eq!(parse_ttl("3600").unwrap(), 3600);
/// assert_eq!(parse_ttl("2h").unwrap(), 7200);
/// assert_eq!(parse_ttl("1d").unwrap(), 86400);
///
/// assert!(parse_ttl("").is_err());
/// assert!(parse_ttl("0").is_err());
/// assert!(parse_ttl("10x").is_err());
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTtl`] if:
/// - The string is empty or the numeric part is missing
/// - The unit is not one of `s`, `m`, `h`, `d`, `w`
/// - The value is zero or exceeds 2^31 - 1 seconds
pub fn parse_ttl(spec: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidTtl {
        value: spec.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(invalid("TTL cannot be empty"));
    }

    // Find where digits end and unit begins
    let split_pos = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(trimmed.len(), |(i, _)| i);
    let (value_str, unit) = trimmed.split_at(split_pos);

    if value_str.is_empty() {
        return Err(invalid("TTL must start with a number"));
    }

    let value: u64 = value_str
        .parse()
        .map_err(|_| invalid("TTL value is too large"))?;

    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "" | "s" => 1,
        "m" => SECONDS_PER_MINUTE,
        "h" => SECONDS_PER_HOUR,
        "d" => SECONDS_PER_DAY,
        "w" => SECONDS_PER_WEEK,
        _ => {
            return Err(invalid(
                "unsupported unit, use s (seconds), m (minutes), h (hours), d (days) or w (weeks)",
            ))
        }
    };

    let seconds = value
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("TTL value is too large"))?;

    if seconds == 0 {
        return Err(invalid("TTL must be greater than zero"));
    }

    u32::try_from(seconds)
        .ok()
        .filter(|s| *s <= MAX_RECORD_TTL_SECS)
        .ok_or_else(|| invalid("TTL exceeds the maximum of 2147483647 seconds"))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
