//! Outcomes of folding one tick into a timeline.

use candela_types::Candle;
use chrono::{DateTime, Utc};

/// What applying a tick did to an aggregator's timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing was stored for the timeline; the tick opened its first candle.
    Opened,
    /// The tick's bucket was recovered from storage and updated.
    Resumed,
    /// The tick updated the open candle in place.
    Updated,
    /// The tick crossed a bucket boundary: `closed` is final and a new
    /// candle was opened for the tick.
    Rolled {
        /// The candle that was open before this tick.
        closed: Candle,
    },
    /// The tick belongs to a bucket before the open one.
    Late {
        /// Bucket start of the tick.
        bucket: DateTime<Utc>,
        /// Whether a stored candle for that bucket was updated.
        applied: bool,
    },
}

impl Transition {
    /// Returns true if the tick created a new candle.
    #[must_use]
    pub const fn is_new_bucket(&self) -> bool {
        matches!(self, Self::Opened | Self::Rolled { .. })
    }

    /// Returns the candle closed by the tick, if any.
    #[must_use]
    pub const fn closed(&self) -> Option<&Candle> {
        match self {
            Self::Rolled { closed } => Some(closed),
            _ => None,
        }
    }

    /// Returns true for a late tick.
    #[must_use]
    pub const fn is_late(&self) -> bool {
        matches!(self, Self::Late { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_types::BucketDuration;

    #[test]
    fn test_new_bucket_signal() {
        let closed = Candle::new("BTC_JPY", BucketDuration::MINUTE, DateTime::UNIX_EPOCH, 1.0, 0.0);

        assert!(Transition::Opened.is_new_bucket());
        assert!(Transition::Rolled { closed: closed.clone() }.is_new_bucket());
        assert!(!Transition::Resumed.is_new_bucket());
        assert!(!Transition::Updated.is_new_bucket());
        assert!(
            !Transition::Late {
                bucket: DateTime::UNIX_EPOCH,
                applied: true
            }
            .is_new_bucket()
        );

        assert_eq!(Transition::Rolled { closed: closed.clone() }.closed(), Some(&closed));
        assert_eq!(Transition::Updated.closed(), None);
    }
}
