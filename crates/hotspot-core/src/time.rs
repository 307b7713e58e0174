//! Timestamp helpers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix timestamp in seconds. Clock-before-epoch degrades to 0.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
