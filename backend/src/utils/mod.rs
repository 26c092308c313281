//! # Utilities Module
//!
//! This module contains helper functions and utilities used
//! across the backend service.

use chrono::{NaiveDateTime, SubsecRound, Utc};

/// Accepted layouts for report boundaries, tried in order.
///
/// These are ISO local date-times: no offset, seconds and fraction optional.
const LOCAL_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Current UTC wall-clock time without a zone.
///
/// Truncated to microseconds, which is what a Postgres `TIMESTAMP`
/// stores, so a value read back compares equal to the one written.
pub fn now_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

/// Parse an ISO 8601 local date-time (no offset).
///
/// ## Arguments
///
/// * `timestamp_str` - e.g. `2024-01-31T23:59:59` or `2024-01-31T23:59`
///
/// ## Returns
///
/// * `Ok(NaiveDateTime)` - Parsed timestamp
/// * `Err(String)` - Input does not match any accepted layout
pub fn parse_timestamp(timestamp_str: &str) -> Result<NaiveDateTime, String> {
    let trimmed = timestamp_str.trim();

    LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| format!("Invalid timestamp: '{}' (expected YYYY-MM-DDTHH:MM:SS)", timestamp_str))
}
