//! Small timestamp helpers shared by the run store and the CDP session.

use chrono::{DateTime, Utc};
use serde::Serializer;

/// Formats a UTC timestamp as ISO-8601 with a trailing `Z`, matching the
/// wire format used by `LogEntry`, `RunInstance`, and `CurrentRunContext`.
pub fn to_z(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// `#[serde(serialize_with = "frago_core::time::serialize")]` adapter for
/// timestamp fields that need `to_z`'s millisecond-truncated wire format.
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_z(*ts))
}
