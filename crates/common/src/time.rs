//! Timestamp encoding shared by the watermark record and the transcript.
//!
//! Timestamps are ISO-8601 UTC with millisecond precision
//! (`2024-01-01T00:00:00.000Z`).

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Render a timestamp in the canonical persisted form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse any RFC 3339 timestamp and normalise it to UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

/// Drop sub-millisecond precision, the resolution timestamps are persisted
/// at. Watermark comparisons happen at this resolution.
pub fn truncate_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

/// Current wall-clock time truncated to millisecond precision, so that it
/// round-trips through [`format_timestamp`] unchanged.
pub fn now_millis() -> DateTime<Utc> {
    truncate_millis(Utc::now())
}
