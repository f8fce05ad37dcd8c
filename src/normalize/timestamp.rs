//! Conversion between store timestamps and the fixed UTC+7 display string.
//!
//! Exported files carry timestamps as `M/D/YYYY, H:MM:SS AM|PM UTC+7`
//! (e.g. `9/30/2025, 2:26:33 PM UTC+7`). The zone is Asia/Bangkok, which has
//! no daylight saving, so a fixed offset is exact.

use std::sync::OnceLock;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use thiserror::Error;

use crate::models::Timestamp;

/// Offset of the export zone, in seconds east of UTC.
const OFFSET_SECONDS: i32 = 7 * 3600;

/// Literal suffix appended to every formatted timestamp.
pub const ZONE_SUFFIX: &str = " UTC+7";

#[derive(Error, Debug, PartialEq)]
pub enum TimestampError {
    #[error("Invalid timestamp format: {0}")]
    InvalidFormat(String),

    #[error("Invalid calendar date in timestamp: {0}")]
    InvalidDate(String),

    #[error("Invalid time of day in timestamp: {0}")]
    InvalidTime(String),
}

fn zone() -> FixedOffset {
    FixedOffset::east_opt(OFFSET_SECONDS).expect("UTC+7 is a valid offset")
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Newer ICU builds put a narrow no-break space before the meridiem.
        Regex::new(
            r"^(\d{1,2})/(\d{1,2})/(\d{4}), (\d{1,2}):(\d{2}):(\d{2})[ \x{202F}](AM|PM) UTC\+7$",
        )
        .expect("timestamp pattern is valid")
    })
}

/// Returns true if `s` has the shape of a formatted timestamp.
///
/// A match does not guarantee the string parses: `13/45/2025, ...` matches
/// but is not a valid date.
pub fn looks_like_timestamp(s: &str) -> bool {
    pattern().is_match(s)
}

/// Formats a timestamp as `M/D/YYYY, H:MM:SS AM|PM UTC+7`.
///
/// Sub-second precision is dropped.
pub fn format_timestamp(ts: &Timestamp) -> String {
    let local = ts.to_datetime().with_timezone(&zone());
    format!("{}{}", local.format("%-m/%-d/%Y, %-I:%M:%S %p"), ZONE_SUFFIX)
}

/// Parses a string produced by [`format_timestamp`] back into a timestamp.
///
/// The `UTC+7` suffix stands for a `+0700` offset.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, TimestampError> {
    let caps = pattern()
        .captures(s)
        .ok_or_else(|| TimestampError::InvalidFormat(s.to_string()))?;

    let field = |i: usize| -> Result<u32, TimestampError> {
        caps[i]
            .parse()
            .map_err(|_| TimestampError::InvalidFormat(s.to_string()))
    };

    let month = field(1)?;
    let day = field(2)?;
    let year: i32 = caps[3]
        .parse()
        .map_err(|_| TimestampError::InvalidFormat(s.to_string()))?;
    let hour12 = field(4)?;
    let minute = field(5)?;
    let second = field(6)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| TimestampError::InvalidDate(s.to_string()))?;

    if !(1..=12).contains(&hour12) {
        return Err(TimestampError::InvalidTime(s.to_string()));
    }
    let hour = match (&caps[7], hour12) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        (_, h) => h + 12,
    };
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| TimestampError::InvalidTime(s.to_string()))?;

    let local = zone()
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
        .ok_or_else(|| TimestampError::InvalidTime(s.to_string()))?;

    Ok(Timestamp::from_datetime(&local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ts_utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        Timestamp::from_datetime(&Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
    }

    #[test]
    fn test_format_afternoon() {
        // 07:26:33 UTC is 14:26:33 in UTC+7
        let ts = ts_utc(2025, 9, 30, 7, 26, 33);
        assert_eq!(format_timestamp(&ts), "9/30/2025, 2:26:33 PM UTC+7");
    }

    #[test]
    fn test_format_midnight_uses_twelve_am() {
        let ts = ts_utc(2024, 12, 31, 17, 0, 5);
        assert_eq!(format_timestamp(&ts), "1/1/2025, 12:00:05 AM UTC+7");
    }

    #[test]
    fn test_format_noon_uses_twelve_pm() {
        let ts = ts_utc(2025, 3, 4, 5, 9, 0);
        assert_eq!(format_timestamp(&ts), "3/4/2025, 12:09:00 PM UTC+7");
    }

    #[test]
    fn test_format_drops_subseconds() {
        let ts = Timestamp::new(ts_utc(2025, 9, 30, 7, 26, 33).seconds(), 999_000_000).unwrap();
        assert_eq!(format_timestamp(&ts), "9/30/2025, 2:26:33 PM UTC+7");
    }

    #[test]
    fn test_parse_matches_civil_time_in_utc_plus_7() {
        let parsed = parse_timestamp("9/30/2025, 2:26:33 PM UTC+7").unwrap();
        let expected = zone().with_ymd_and_hms(2025, 9, 30, 14, 26, 33).unwrap();
        assert_eq!(parsed, Timestamp::from_datetime(&expected));
        assert_eq!(parsed, ts_utc(2025, 9, 30, 7, 26, 33));
    }

    #[test]
    fn test_parse_twelve_am_and_pm() {
        assert_eq!(
            parse_timestamp("1/1/2025, 12:00:05 AM UTC+7").unwrap(),
            ts_utc(2024, 12, 31, 17, 0, 5)
        );
        assert_eq!(
            parse_timestamp("3/4/2025, 12:09:00 PM UTC+7").unwrap(),
            ts_utc(2025, 3, 4, 5, 9, 0)
        );
    }

    #[test]
    fn test_parse_accepts_narrow_no_break_space() {
        let parsed = parse_timestamp("9/30/2025, 2:26:33\u{202F}PM UTC+7").unwrap();
        assert_eq!(parsed, ts_utc(2025, 9, 30, 7, 26, 33));
    }

    #[test]
    fn test_parse_zero_padded_fields() {
        let parsed = parse_timestamp("09/05/2025, 02:26:33 PM UTC+7").unwrap();
        assert_eq!(parsed, ts_utc(2025, 9, 5, 7, 26, 33));
    }

    #[test]
    fn test_format_parse_roundtrip() {
        for ts in [
            ts_utc(1999, 12, 31, 23, 59, 59),
            ts_utc(2020, 2, 29, 0, 0, 0),
            ts_utc(2025, 6, 15, 12, 0, 0),
        ] {
            assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
        }
    }

    #[test]
    fn test_looks_like_timestamp() {
        assert!(looks_like_timestamp("9/30/2025, 2:26:33 PM UTC+7"));
        assert!(looks_like_timestamp("13/45/2025, 2:26:33 PM UTC+7"));
        assert!(!looks_like_timestamp("2025-09-30T07:26:33Z"));
        assert!(!looks_like_timestamp("Meeting 9/30/2025, 2:26:33 PM UTC+7"));
        assert!(!looks_like_timestamp("9/30/2025, 2:26:33 PM UTC+8"));
    }

    #[test]
    fn test_parse_invalid_date() {
        let err = parse_timestamp("13/45/2025, 2:26:33 PM UTC+7").unwrap_err();
        assert!(matches!(err, TimestampError::InvalidDate(_)));
    }

    #[test]
    fn test_parse_invalid_hour() {
        let err = parse_timestamp("9/30/2025, 0:26:33 PM UTC+7").unwrap_err();
        assert!(matches!(err, TimestampError::InvalidTime(_)));

        let err = parse_timestamp("9/30/2025, 2:61:33 PM UTC+7").unwrap_err();
        assert!(matches!(err, TimestampError::InvalidTime(_)));
    }

    #[test]
    fn test_parse_wrong_shape() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert_eq!(err, TimestampError::InvalidFormat("yesterday".to_string()));
    }
}
