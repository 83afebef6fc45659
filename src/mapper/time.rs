//! Wire timestamp handling
//!
//! The backend sends ISO-8601 strings (or null). Absent or unparseable values
//! map to `None`, never to the epoch or "now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres `timestamp` (no zone) and plain `date` columns
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    log::warn!("[MAPPER] Ignoring unparseable timestamp {:?}", raw);
    None
}

/// RFC 3339 in UTC, keeping sub-second precision
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn format_opt(ts: &Option<DateTime<Utc>>) -> Option<String> {
    ts.as_ref().map(format_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_postgres_timestamptz() {
        let ts = parse_timestamp(Some("2024-03-01T09:30:00.123456+00:00")).unwrap();
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_offset_is_normalized_to_utc() {
        let ts = parse_timestamp(Some("2024-03-01T11:30:00+02:00")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_plain_date() {
        let ts = parse_timestamp(Some("2024-12-24")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 12, 24, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_or_garbage_is_none() {
        assert_eq!(parse_timestamp(None), None);
        assert_eq!(parse_timestamp(Some("")), None);
        assert_eq!(parse_timestamp(Some("next tuesday")), None);
    }

    #[test]
    fn test_format_keeps_milliseconds() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let text = format_timestamp(&ts);
        assert_eq!(text, "2023-11-14T22:13:20.123Z");
        assert_eq!(parse_timestamp(Some(&text)), Some(ts));
    }
}
