use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::TypeError;

/// UTC wall-clock timestamp used for ticket creation, updates, and deadlines.
pub type Timestamp = DateTime<Utc>;

/// Parse an RFC 3339 timestamp and normalize it to UTC.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, TypeError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TypeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Render a timestamp as RFC 3339 with second precision and a `Z` suffix,
/// e.g. `2024-01-15T11:00:00Z`.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
