//! Common types used across the console

use chrono::{DateTime, TimeZone, Utc};

/// Point in time used for every warranty computation
pub type Timestamp = DateTime<Utc>;

/// Identifier assigned by the upstream API (`id_cliente`, `id_veiculo`, ...)
pub type EntityId = i64;

/// Convert milliseconds since the Unix epoch (as produced by `Date.now()`)
/// into a [`Timestamp`]
pub fn timestamp_from_millis(millis: i64) -> Option<Timestamp> {
    Utc.timestamp_millis_opt(millis).single()
}
