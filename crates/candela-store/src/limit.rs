//! Row limits for range queries.

use std::fmt;

/// Number of most recent candles a range query returns.
///
/// Always in `1..=QueryLimit::MAX`. Anything outside that range, including a
/// missing or unparseable value, falls back to the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryLimit(u32);

impl QueryLimit {
    /// Largest number of candles returned by one query.
    pub const MAX: Self = Self(1000);

    /// Creates a limit, falling back to [`QueryLimit::MAX`] when `value` is
    /// non-positive or above the maximum.
    #[must_use]
    pub fn new(value: i64) -> Self {
        u32::try_from(value)
            .ok()
            .filter(|v| (1..=Self::MAX.0).contains(v))
            .map_or(Self::MAX, Self)
    }

    /// Parses a raw limit as received from a query string.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map_or(Self::MAX, Self::new)
    }

    /// Returns the limit as a count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Default for QueryLimit {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<i64> for QueryLimit {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for QueryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range() {
        assert_eq!(QueryLimit::new(1).get(), 1);
        assert_eq!(QueryLimit::new(250).get(), 250);
        assert_eq!(QueryLimit::new(1000).get(), 1000);
    }

    #[test]
    fn test_out_of_range_falls_back_to_max() {
        assert_eq!(QueryLimit::new(0), QueryLimit::MAX);
        assert_eq!(QueryLimit::new(-5), QueryLimit::MAX);
        assert_eq!(QueryLimit::new(1001), QueryLimit::MAX);
        assert_eq!(QueryLimit::new(i64::MAX), QueryLimit::MAX);
    }

    #[test]
    fn test_parse() {
        assert_eq!(QueryLimit::parse(Some("10")).get(), 10);
        assert_eq!(QueryLimit::parse(Some(" 42 ")).get(), 42);
        assert_eq!(QueryLimit::parse(Some("abc")), QueryLimit::MAX);
        assert_eq!(QueryLimit::parse(Some("-1")), QueryLimit::MAX);
        assert_eq!(QueryLimit::parse(Some("")), QueryLimit::MAX);
        assert_eq!(QueryLimit::parse(None), QueryLimit::MAX);
    }
}
