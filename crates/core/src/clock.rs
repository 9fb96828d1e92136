//! Timestamp helpers shared by the index store and indexer.
//!
//! The persisted index file stores ISO-8601 (RFC 3339) strings per the external
//! format (spec §6); internally we compare timestamps as unix milliseconds, so
//! everything that touches wall-clock time funnels through here.

use std::time::SystemTime;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub fn now_iso8601() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub fn now_millis() -> i64 {
    system_time_to_millis(SystemTime::now())
}

pub fn system_time_to_millis(t: SystemTime) -> i64 {
    match t.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

pub fn millis_to_iso8601(millis: i64) -> String {
    let dt = OffsetDateTime::UNIX_EPOCH + time::Duration::milliseconds(millis);
    dt.format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub fn iso8601_to_millis(s: &str) -> Option<i64> {
    let dt = OffsetDateTime::parse(s, &Rfc3339).ok()?;
    let duration = dt - OffsetDateTime::UNIX_EPOCH;
    Some(duration.whole_milliseconds() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_iso8601() {
        let millis = 1_700_000_000_000i64;
        let iso = millis_to_iso8601(millis);
        assert_eq!(iso8601_to_millis(&iso), Some(millis));
    }
}
