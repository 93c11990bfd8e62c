use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time as unix epoch milliseconds. All persisted timestamps use this.
#[must_use]
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}
