use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, the timestamp base for location fixes.
pub fn now_unix_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Unable to get current time");
    now.as_millis() as u64
}
