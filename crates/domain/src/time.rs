//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for `created_at`, `last_executed`, meeting times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Calendar date of `ts` in UTC. Overdue checks compare dates only.
#[must_use]
pub fn date_of(ts: Timestamp) -> NaiveDate {
    ts.date_naive()
}

/// Format a timestamp the way it is persisted: RFC 3339, UTC, second precision.
///
/// Every stored timestamp uses this exact shape so lexicographic comparison
/// in SQL matches chronological order.
#[must_use]
pub fn to_storage(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a persisted RFC 3339 timestamp.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimestamp`] when `value` is not RFC 3339.
pub fn from_storage(value: &str) -> Result<Timestamp, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(|_| ValidationError::InvalidTimestamp(value.to_owned()))
}
