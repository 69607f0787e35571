//! Wire timestamps: whole seconds since the Unix epoch (UTC).
//!
//! Instants are kept as `DateTime<Utc>` inside the service and only turned
//! into integers on the way out. Sub-second precision is dropped.

use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC instant, truncated to whole seconds.
///
/// Stored instants then match their wire encoding exactly, and second-precision
/// `DATETIME` columns cannot round them up.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Encode an instant as seconds since the epoch, truncating sub-second precision.
pub fn encode(instant: DateTime<Utc>) -> i64 {
    instant.timestamp()
}

/// Current instant, already encoded.
pub fn now_encoded() -> i64 {
    encode(now())
}
