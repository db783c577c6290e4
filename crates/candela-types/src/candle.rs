//! OHLCV candle data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BucketDuration, Tick};

/// OHLCV bar for one bucket of one instrument.
///
/// `(product_code, duration, time)` identifies a candle uniquely; it is the
/// storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Instrument identifier.
    pub product_code: String,
    /// Bucket width.
    pub duration: BucketDuration,
    /// Bucket start time.
    pub time: DateTime<Utc>,
    /// First price seen in the bucket.
    pub open: f64,
    /// Last price seen in the bucket.
    pub close: f64,
    /// Highest price seen in the bucket.
    pub high: f64,
    /// Lowest price seen in the bucket.
    pub low: f64,
    /// Exchange-reported cumulative volume as of the last tick.
    pub volume: f64,
}

impl Candle {
    /// Creates a single-price candle.
    #[must_use]
    pub fn new(
        product_code: impl Into<String>,
        duration: BucketDuration,
        time: DateTime<Utc>,
        price: f64,
        volume: f64,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            duration,
            time,
            open: price,
            close: price,
            high: price,
            low: price,
            volume,
        }
    }

    /// Opens the candle for the bucket containing `tick`.
    #[must_use]
    pub fn from_tick(tick: &Tick, duration: BucketDuration) -> Self {
        Self::new(
            tick.product_code.clone(),
            duration,
            tick.bucket_start(duration),
            tick.price(),
            tick.volume,
        )
    }

    /// Folds a tick into the candle.
    ///
    /// Extends the high/low, overwrites the close, and overwrites the volume:
    /// the tick's volume is already cumulative, so summing it would double count.
    pub fn apply(&mut self, tick: &Tick) {
        let price = tick.price();
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume = tick.volume;
    }

    /// Returns a copy of the candle with `tick` folded in.
    #[must_use]
    pub fn with_tick(&self, tick: &Tick) -> Self {
        let mut next = self.clone();
        next.apply(tick);
        next
    }
}

/// Candles of one instrument and duration, ordered by bucket start ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    /// Instrument identifier.
    pub product_code: String,
    /// Bucket width.
    pub duration: BucketDuration,
    /// The candles, oldest first.
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    /// Creates a series.
    #[must_use]
    pub fn new(product_code: impl Into<String>, duration: BucketDuration, candles: Vec<Candle>) -> Self {
        Self {
            product_code: product_code.into(),
            duration,
            candles,
        }
    }

    /// Returns the number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Returns true if the series holds no candles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Returns the most recent candle.
    #[must_use]
    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tick_at(second: u32, price: f64, volume: f64) -> Tick {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, second).unwrap();
        Tick::new("BTC_JPY", ts, price, price, price, volume)
    }

    #[test]
    fn test_from_tick() {
        let candle = Candle::from_tick(&tick_at(5, 100.0, 7.0), BucketDuration::MINUTE);

        assert_eq!(candle.time, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        assert!((candle.open - 100.0).abs() < 1e-10);
        assert!((candle.high - 100.0).abs() < 1e-10);
        assert!((candle.low - 100.0).abs() < 1e-10);
        assert!((candle.close - 100.0).abs() < 1e-10);
        assert!((candle.volume - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_apply_extends_range_and_overwrites_volume() {
        let mut candle = Candle::from_tick(&tick_at(5, 100.0, 7.0), BucketDuration::MINUTE);
        candle.apply(&tick_at(20, 110.0, 9.0));
        candle.apply(&tick_at(40, 95.0, 12.0));

        assert!((candle.open - 100.0).abs() < 1e-10);
        assert!((candle.high - 110.0).abs() < 1e-10);
        assert!((candle.low - 95.0).abs() < 1e-10);
        assert!((candle.close - 95.0).abs() < 1e-10);
        assert!((candle.volume - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_with_tick_leaves_original() {
        let candle = Candle::from_tick(&tick_at(5, 100.0, 7.0), BucketDuration::MINUTE);
        let next = candle.with_tick(&tick_at(6, 120.0, 8.0));

        assert!((candle.close - 100.0).abs() < 1e-10);
        assert!((next.close - 120.0).abs() < 1e-10);
    }

    #[test]
    fn test_series_json_shape() {
        let candle = Candle::from_tick(&tick_at(5, 100.0, 7.0), BucketDuration::HOUR);
        let series = CandleSeries::new("BTC_JPY", BucketDuration::HOUR, vec![candle]);
        let json: serde_json::Value = serde_json::to_value(&series).unwrap();

        assert_eq!(json["product_code"], "BTC_JPY");
        assert_eq!(json["duration"], 3_600_000_000_000_u64);
        assert_eq!(json["candles"][0]["time"], "2024-01-01T10:00:00Z");
        assert_eq!(json["candles"][0]["open"], 100.0);

        let back: CandleSeries = serde_json::from_value(json).unwrap();
        assert_eq!(back, series);
    }
}
