//! Ticker data representation.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::BucketDuration;

/// Layout of exchange timestamps that arrive without a zone suffix.
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single ticker update from the exchange.
///
/// Field names follow the exchange's wire format. Missing numeric fields
/// decode as zero and an unusable timestamp decodes as the Unix epoch, so a
/// partially filled update never aborts the stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tick {
    /// Instrument identifier (e.g. `BTC_JPY`).
    pub product_code: String,
    /// Market state reported by the exchange (e.g. `RUNNING`).
    pub state: String,
    /// Exchange timestamp (UTC).
    #[serde(
        deserialize_with = "lenient_timestamp",
        default = "missing_timestamp"
    )]
    pub timestamp: DateTime<Utc>,
    /// Exchange tick sequence number.
    #[serde(deserialize_with = "lenient_id")]
    pub tick_id: i64,
    /// Best bid price.
    pub best_bid: f64,
    /// Best ask price.
    pub best_ask: f64,
    /// Size available at the best bid.
    pub best_bid_size: f64,
    /// Size available at the best ask.
    pub best_ask_size: f64,
    /// Total resting bid depth.
    pub total_bid_depth: f64,
    /// Total resting ask depth.
    pub total_ask_depth: f64,
    /// Market (unpriced) bid size.
    pub market_bid_size: f64,
    /// Market (unpriced) ask size.
    pub market_ask_size: f64,
    /// Last traded price.
    pub ltp: f64,
    /// Exchange-reported cumulative 24h volume.
    pub volume: f64,
    /// Cumulative 24h volume for this product only.
    pub volume_by_product: f64,
}

impl Tick {
    /// Creates a tick with the fields the candle pipeline reads.
    #[must_use]
    pub fn new(
        product_code: impl Into<String>,
        timestamp: DateTime<Utc>,
        best_bid: f64,
        best_ask: f64,
        ltp: f64,
        volume: f64,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            timestamp,
            best_bid,
            best_ask,
            ltp,
            volume,
            ..Self::default()
        }
    }

    /// Returns the mid price (average of best bid and best ask).
    #[must_use]
    pub fn mid_price(&self) -> f64 {
        (self.best_bid + self.best_ask) / 2.0
    }

    /// Returns the spread (ask - bid).
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.best_ask - self.best_bid
    }

    /// Returns the price folded into candles.
    ///
    /// The mid price, or the last traded price when the book side is empty.
    #[must_use]
    pub fn price(&self) -> f64 {
        if self.best_bid == 0.0 && self.best_ask == 0.0 {
            self.ltp
        } else {
            self.mid_price()
        }
    }

    /// Returns the start of the bucket this tick belongs to.
    #[must_use]
    pub fn bucket_start(&self, duration: BucketDuration) -> DateTime<Utc> {
        duration.truncate(self.timestamp)
    }

    /// Parses an exchange timestamp.
    ///
    /// Accepts RFC 3339 (`2021-01-11T04:53:42.4858142Z`) and the same layout
    /// without a zone suffix (`2021-01-11T04:47:33.087`), which is read as UTC.
    #[must_use]
    pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, NAIVE_TIMESTAMP_FORMAT)
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(missing_timestamp());
    };

    Ok(Tick::parse_timestamp(&raw).unwrap_or_else(|| {
        tracing::warn!(timestamp = %raw, "unparseable tick timestamp, using epoch");
        DateTime::UNIX_EPOCH
    }))
}

fn missing_timestamp() -> DateTime<Utc> {
    tracing::warn!("tick without timestamp, using epoch");
    DateTime::UNIX_EPOCH
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    // Some payloads carry the id in float notation (1.609472e+06).
    let id = f64::deserialize(deserializer)?;
    Ok(id as i64)
}
