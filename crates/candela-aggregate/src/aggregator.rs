//! Bucket state machine for one `(product_code, duration)` timeline.

use std::cmp::Ordering;

use candela_store::{CandleStore, StoreError};
use candela_types::{BucketDuration, Candle, Tick};

use crate::Transition;

/// In-memory state of one timeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BucketState {
    /// No tick seen yet, or restarted before recovery.
    #[default]
    NoCurrentBucket,
    /// The candle ticks are currently folded into.
    BucketOpen(Candle),
}

/// The write a tick requires, decided before anything is persisted.
struct Step {
    write: Option<Candle>,
    opens: bool,
    transition: Transition,
}

impl Step {
    const fn open(candle: Candle, transition: Transition) -> Self {
        Self {
            write: Some(candle),
            opens: true,
            transition,
        }
    }
}

/// Aggregates ticks into candles for one instrument and duration.
///
/// The store is the source of truth: every tick results in at most one
/// upsert of a full candle row, and the in-memory state only advances once
/// that write succeeded. A failed tick leaves the aggregator exactly as it
/// was, so the same tick can be applied again.
#[derive(Debug, Clone)]
pub struct CandleAggregator {
    product_code: String,
    duration: BucketDuration,
    state: BucketState,
}

impl CandleAggregator {
    /// Creates an aggregator in the [`BucketState::NoCurrentBucket`] state.
    #[must_use]
    pub fn new(product_code: impl Into<String>, duration: BucketDuration) -> Self {
        Self {
            product_code: product_code.into(),
            duration,
            state: BucketState::NoCurrentBucket,
        }
    }

    /// Returns the instrument being aggregated.
    #[must_use]
    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    /// Returns the bucket width.
    #[must_use]
    pub const fn duration(&self) -> BucketDuration {
        self.duration
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &BucketState {
        &self.state
    }

    /// Returns the open candle, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Candle> {
        match &self.state {
            BucketState::BucketOpen(candle) => Some(candle),
            BucketState::NoCurrentBucket => None,
        }
    }

    /// Folds `tick` into the timeline and persists the result.
    ///
    /// On the first tick the last stored candle is recovered as the open
    /// bucket. A tick for an earlier bucket than the open one only updates
    /// the stored candle of that bucket, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the store fails. The in-memory
    /// state is unchanged in that case.
    pub fn apply(&mut self, store: &CandleStore, tick: &Tick) -> Result<Transition, StoreError> {
        let start = tick.bucket_start(self.duration);

        let recovering = matches!(self.state, BucketState::NoCurrentBucket);
        let recovered = if recovering {
            store.latest(&self.product_code, self.duration)?
        } else {
            None
        };

        let current = match &self.state {
            BucketState::BucketOpen(candle) => Some(candle),
            BucketState::NoCurrentBucket => recovered.as_ref(),
        };

        let step = match current.map(|c| (start.cmp(&c.time), c)) {
            None => Step::open(Candle::from_tick(tick, self.duration), Transition::Opened),
            Some((Ordering::Equal, c)) => {
                let transition = if recovering {
                    Transition::Resumed
                } else {
                    Transition::Updated
                };
                Step::open(c.with_tick(tick), transition)
            }
            Some((Ordering::Greater, c)) => Step::open(
                Candle::from_tick(tick, self.duration),
                Transition::Rolled { closed: c.clone() },
            ),
            Some((Ordering::Less, c)) => {
                let historical = store.find(&self.product_code, self.duration, start)?;
                if historical.is_none() {
                    tracing::warn!(
                        product_code = %self.product_code,
                        duration = %self.duration,
                        bucket = %start,
                        open_bucket = %c.time,
                        "dropping late tick with no stored bucket"
                    );
                }
                Step {
                    transition: Transition::Late {
                        bucket: start,
                        applied: historical.is_some(),
                    },
                    write: historical.map(|h| h.with_tick(tick)),
                    opens: false,
                }
            }
        };

        if let Some(candle) = step.write {
            store.upsert(&candle)?;
            if step.opens {
                self.state = BucketState::BucketOpen(candle);
            }
        }
        if !step.opens {
            if let Some(candle) = recovered {
                self.state = BucketState::BucketOpen(candle);
            }
        }

        Ok(step.transition)
    }
}
