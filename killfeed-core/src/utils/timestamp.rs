//! Display normalization for upstream timestamps.
//!
//! The source sends ISO-8601 strings, usually UTC with a `Z` suffix.
//! Anything that does not parse is shown as-is rather than dropped.

use serde_json::Value;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Format used for every timestamp the server displays.
fn display(dt: PrimitiveDateTime) -> Option<String> {
    dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .ok()
}

/// Parse an upstream timestamp, keeping its wall-clock time in its own offset.
pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(raw, &Iso8601::DEFAULT))
        .map(|dt| PrimitiveDateTime::new(dt.date(), dt.time()))
        .or_else(|_| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT))
        .ok()
}

/// `YYYY-MM-DD HH:MM:SS` when `raw` parses, otherwise `raw` unchanged.
pub fn normalize_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .and_then(display)
        .unwrap_or_else(|| raw.to_string())
}

/// Normalize a `TimeStamp` field of any JSON type.
///
/// Missing or `null` becomes the empty string; non-strings are rendered as JSON.
pub fn normalize_timestamp_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(raw)) => normalize_timestamp(raw),
        Some(other) => other.to_string(),
    }
}

/// Render a last-update instant in UTC.
pub fn format_last_update(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    display(PrimitiveDateTime::new(utc.date(), utc.time())).unwrap_or_else(|| utc.to_string())
}
