//! Timezone helpers
//!
//! IANA name resolution and UTC offsets, backed by chrono-tz.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::listeners::ListenerError;

/// Resolve an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ListenerError> {
    name.parse::<Tz>()
        .map_err(|_| ListenerError::UnknownTimezone(name.to_string()))
}

/// UTC offset of `tz` at the given instant, in minutes east of UTC
pub fn utc_offset_minutes(tz: Tz, at: DateTime<Utc>) -> i64 {
    let offset = tz.offset_from_utc_datetime(&at.naive_utc()).fix();
    i64::from(offset.local_minus_utc()) / 60
}

/// Offset of `new` minus offset of `previous`, both taken at `at`
pub fn offset_diff_minutes(
    new: &str,
    previous: &str,
    at: DateTime<Utc>,
) -> Result<i64, ListenerError> {
    let new = parse_timezone(new)?;
    let previous = parse_timezone(previous)?;

    Ok(utc_offset_minutes(new, at) - utc_offset_minutes(previous, at))
}
