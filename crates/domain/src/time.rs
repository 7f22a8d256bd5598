//! Timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for record bookkeeping such as `updated_at`.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
