//! Candle bucket durations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::num::NonZeroU64;
use std::str::FromStr;
use thiserror::Error;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Width of a candle bucket.
///
/// Always strictly positive, stored with millisecond resolution. Serialized as
/// integer nanoseconds so the query shape matches what chart clients expect
/// (`3600000000000` for one hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketDuration {
    millis: NonZeroU64,
}

impl BucketDuration {
    /// One second.
    pub const SECOND: Self = Self::constant(1_000);
    /// One minute.
    pub const MINUTE: Self = Self::constant(60_000);
    /// One hour.
    pub const HOUR: Self = Self::constant(3_600_000);
    /// One day.
    pub const DAY: Self = Self::constant(86_400_000);

    const fn constant(millis: u64) -> Self {
        match NonZeroU64::new(millis) {
            Some(millis) => Self { millis },
            None => panic!("bucket duration must be non-zero"),
        }
    }

    /// Creates a duration from milliseconds, or `None` for zero.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Option<Self> {
        match NonZeroU64::new(millis) {
            Some(millis) => Some(Self { millis }),
            None => None,
        }
    }

    /// Creates a duration from whole seconds, or `None` for zero or overflow.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Option<Self> {
        match secs.checked_mul(1_000) {
            Some(millis) => Self::from_millis(millis),
            None => None,
        }
    }

    /// Returns the span in milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.millis.get()
    }

    /// Returns the span in nanoseconds, saturating on overflow.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.millis.get().saturating_mul(NANOS_PER_MILLI)
    }

    /// Returns the span as a [`std::time::Duration`].
    #[must_use]
    pub const fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.millis.get())
    }

    /// Truncates a timestamp to the start of its bucket.
    ///
    /// Floor division of Unix milliseconds by the span, so timestamps before
    /// the epoch land in the earlier bucket rather than rounding toward zero.
    #[must_use]
    pub fn truncate(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let span = i64::try_from(self.millis.get()).unwrap_or(i64::MAX);
        let millis = timestamp.timestamp_millis();
        let start = millis - millis.rem_euclid(span);
        DateTime::from_timestamp_millis(start).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Returns the canonical label, using the largest unit that divides evenly.
    #[must_use]
    pub fn label(&self) -> String {
        let millis = self.millis.get();
        for (unit, size) in UNITS {
            if millis % size == 0 {
                return format!("{}{unit}", millis / size);
            }
        }
        format!("{millis}ms")
    }
}

/// Units from largest to smallest.
const UNITS: [(&str, u64); 5] = [
    ("d", 86_400_000),
    ("h", 3_600_000),
    ("m", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

impl std::fmt::Display for BucketDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for BucketDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        let split = label
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| DurationParseError(s.to_string()))?;
        let (digits, unit) = label.split_at(split);

        let count: u64 = digits
            .parse()
            .map_err(|_| DurationParseError(s.to_string()))?;
        let size = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, size)| *size)
            .ok_or_else(|| DurationParseError(s.to_string()))?;

        count
            .checked_mul(size)
            .and_then(Self::from_millis)
            .ok_or_else(|| DurationParseError(s.to_string()))
    }
}

impl Serialize for BucketDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_nanos())
    }
}

impl<'de> Deserialize<'de> for BucketDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nanos = u64::deserialize(deserializer)?;
        Self::from_millis(nanos / NANOS_PER_MILLI)
            .ok_or_else(|| serde::de::Error::custom("bucket duration must be at least 1ms"))
    }
}

/// Error returned when parsing an invalid duration label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid duration '{0}', expected a positive count followed by ms, s, m, h or d")]
pub struct DurationParseError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_duration_constants() {
        assert_eq!(BucketDuration::SECOND.as_millis(), 1_000);
        assert_eq!(BucketDuration::MINUTE.as_millis(), 60_000);
        assert_eq!(BucketDuration::HOUR.as_millis(), 3_600_000);
        assert_eq!(BucketDuration::DAY.as_millis(), 86_400_000);
        assert_eq!(BucketDuration::HOUR.as_nanos(), 3_600_000_000_000);
    }

    #[test]
    fn test_duration_parse() {
        assert_eq!("1m".parse::<BucketDuration>().unwrap(), BucketDuration::MINUTE);
        assert_eq!("1H".parse::<BucketDuration>().unwrap(), BucketDuration::HOUR);
        assert_eq!(
            "15m".parse::<BucketDuration>().unwrap().as_millis(),
            15 * 60_000
        );
        assert_eq!("250ms".parse::<BucketDuration>().unwrap().as_millis(), 250);
        assert!("0m".parse::<BucketDuration>().is_err());
        assert!("m".parse::<BucketDuration>().is_err());
        assert!("10".parse::<BucketDuration>().is_err());
        assert!("5w".parse::<BucketDuration>().is_err());
        assert!("-1m".parse::<BucketDuration>().is_err());
    }

    #[test]
    fn test_duration_label() {
        assert_eq!(BucketDuration::MINUTE.label(), "1m");
        assert_eq!(BucketDuration::from_secs(90).unwrap().label(), "90s");
        assert_eq!(BucketDuration::from_secs(7200).unwrap().label(), "2h");
        assert_eq!(BucketDuration::from_millis(1500).unwrap().label(), "1500ms");
    }

    #[test]
    fn test_truncate_floors_to_bucket() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 14, 37, 45).unwrap();

        assert_eq!(BucketDuration::MINUTE.truncate(dt).second(), 0);
        assert_eq!(BucketDuration::MINUTE.truncate(dt).minute(), 37);
        assert_eq!(
            BucketDuration::from_secs(300).unwrap().truncate(dt).minute(),
            35
        );
        assert_eq!(BucketDuration::HOUR.truncate(dt).hour(), 14);
        assert_eq!(BucketDuration::HOUR.truncate(dt).minute(), 0);
        assert_eq!(BucketDuration::DAY.truncate(dt).hour(), 0);
    }

    #[test]
    fn test_truncate_epoch_and_before() {
        assert_eq!(
            BucketDuration::HOUR.truncate(DateTime::UNIX_EPOCH),
            DateTime::UNIX_EPOCH
        );

        let before = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 30).unwrap();
        let expected = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(BucketDuration::MINUTE.truncate(before), expected);
    }

    #[test]
    fn test_serde_as_nanos() {
        let json = serde_json::to_string(&BucketDuration::HOUR).unwrap();
        assert_eq!(json, "3600000000000");

        let parsed: BucketDuration = serde_json::from_str("60000000000").unwrap();
        assert_eq!(parsed, BucketDuration::MINUTE);

        assert!(serde_json::from_str::<BucketDuration>("0").is_err());
    }
}
