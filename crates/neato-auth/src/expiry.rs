//! Token lifetime computation.

use chrono::{DateTime, Months, TimeDelta, Utc};

/// Expiry instant for a lifetime of `seconds` starting at `now`.
///
/// Returns `None` when the result is not representable.
pub fn expiry_from_seconds(now: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(seconds).and_then(|delta| now.checked_add_signed(delta))
}

/// Expiry used when the server sent a lifetime that could not be read.
///
/// One calendar month after `now`, same time of day. When the target month
/// is shorter the day is clamped to its last day, so Jan 31 becomes Feb 29
/// in a leap year and Feb 28 otherwise.
pub fn fallback_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(1))
        .or_else(|| now.checked_add_signed(TimeDelta::days(31)))
        .unwrap_or(now)
}
