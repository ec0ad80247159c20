//! Wall-clock helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp, used to record when the hub inventory was last refreshed.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whole seconds elapsed between `since` and now, clamped at zero.
#[must_use]
pub fn seconds_since(since: Timestamp) -> i64 {
    (now() - since).num_seconds().max(0)
}
