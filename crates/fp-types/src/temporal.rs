use chrono::{DateTime, Utc};

/// Current wall-clock time.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds since the UNIX epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Version token for a write (or read) happening now.
///
/// Versions are decimal millisecond timestamps. They order writes well
/// enough for last-write-wins, but two writes in the same millisecond share
/// a token.
pub fn version_token() -> String {
    now_millis().to_string()
}
