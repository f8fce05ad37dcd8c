use chrono::{DateTime, Utc};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// A point in time as the store represents it: seconds and nanoseconds
/// since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp. Returns `None` if `nanos` is out of range or the
    /// instant cannot be represented as a calendar date.
    pub fn new(seconds: i64, nanos: u32) -> Option<Self> {
        if nanos >= NANOS_PER_SECOND {
            return None;
        }
        DateTime::<Utc>::from_timestamp(seconds, nanos)?;
        Some(Self { seconds, nanos })
    }

    pub fn from_datetime<Tz: chrono::TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Converts to a UTC datetime.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        // `new` and `from_datetime` only admit representable instants
        DateTime::<Utc>::from_timestamp(self.seconds, self.nanos).unwrap_or_default()
    }

    /// Drops the sub-second part.
    pub fn truncated(&self) -> Self {
        Self {
            seconds: self.seconds,
            nanos: 0,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_datetime().to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_rejects_out_of_range_nanos() {
        assert!(Timestamp::new(0, 999_999_999).is_some());
        assert!(Timestamp::new(0, 1_000_000_000).is_none());
    }

    #[test]
    fn test_datetime_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2025, 9, 30, 7, 26, 33).unwrap();
        let ts = Timestamp::from_datetime(&dt);
        assert_eq!(ts.seconds(), dt.timestamp());
        assert_eq!(ts.nanos(), 0);
        assert_eq!(ts.to_datetime(), dt);
    }

    #[test]
    fn test_truncated_drops_nanos() {
        let ts = Timestamp::new(1_700_000_000, 123_456_789).unwrap();
        let truncated = ts.truncated();
        assert_eq!(truncated.seconds(), 1_700_000_000);
        assert_eq!(truncated.nanos(), 0);
    }
}
