//! Wire codec for mount modification times.
//!
//! Executors send timestamps rendered as `2006-01-02 15:04:05.999999999 -0700 MST`
//! (for example `2022-08-15 19:30:25.410972423 +0000 UTC`). The layout is part
//! of the upload protocol: clients must produce it byte-for-byte.

use chrono::{DateTime, Timelike, Utc};
use thiserror::Error;

/// chrono rendition of the wire layout. `%.f` accepts an optional fraction
/// and `%Z` consumes the zone abbreviation; the numeric offset is authoritative.
pub const MODIFIED_AT_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.f %z %Z";

#[derive(Debug, Error)]
#[error("parsing time {value:?}: {source}")]
pub struct TimestampError {
    value: String,
    #[source]
    source: chrono::ParseError,
}

/// Parse a modification time sent by a client.
pub fn parse_modified_at(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_str(value, MODIFIED_AT_LAYOUT)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| TimestampError {
            value: value.to_string(),
            source,
        })
}

/// Render a timestamp in the wire layout.
///
/// The fraction is trimmed of trailing zeros and dropped entirely when the
/// time falls on a whole second.
pub fn format_modified_at(time: &DateTime<Utc>) -> String {
    let mut out = time.format("%Y-%m-%d %H:%M:%S").to_string();

    let nanos = time.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    out.push_str(" +0000 UTC");
    out
}
