//! Benchmark utilities for candela.

use candela_lib::{CandleStore, StoreConfig, StoreError, Tick, initialize_store};
use chrono::{DateTime, TimeDelta, Utc};
use tempfile::TempDir;

/// Channel the synthetic messages are addressed to.
pub const BENCH_CHANNEL: &str = "lightning_ticker_BTC_JPY";

/// Generates `count` ticks `step_ms` apart starting at `start`.
///
/// Prices follow a bounded zig-zag around 5,000,000 so high/low keep moving.
pub fn synthetic_ticks(count: usize, start: DateTime<Utc>, step_ms: i64) -> Vec<Tick> {
    (0..count)
        .map(|i| {
            let offset = i64::try_from(i).unwrap_or(i64::MAX);
            let wiggle = ((i * 7919) % 2001) as f64 - 1000.0;
            let mid = 5_000_000.0 + wiggle;
            Tick::new(
                "BTC_JPY",
                start + TimeDelta::milliseconds(offset.saturating_mul(step_ms)),
                mid - 50.0,
                mid + 50.0,
                mid,
                10_000.0 + i as f64 * 0.01,
            )
        })
        .collect()
}

/// Wraps `tick` in a channel notification as received from the endpoint.
pub fn channel_message(tick: &Tick) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": "channelMessage",
        "params": {
            "channel": BENCH_CHANNEL,
            "message": tick,
        },
    })
    .to_string()
}

/// Opens a store in a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub fn temp_store() -> Result<(TempDir, CandleStore), StoreError> {
    let dir = TempDir::new().map_err(|e| StoreError::CreateDir {
        path: std::env::temp_dir(),
        source: e,
    })?;
    let store = initialize_store(&StoreConfig::at(dir.path().join("bench.db")))?;
    Ok((dir, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_lib::{Inbound, rpc};

    #[test]
    fn test_synthetic_ticks() {
        let ticks = synthetic_ticks(100, DateTime::UNIX_EPOCH, 250);
        assert_eq!(ticks.len(), 100);
        assert_eq!(
            ticks[99].timestamp,
            DateTime::UNIX_EPOCH + TimeDelta::milliseconds(99 * 250)
        );
        assert!(ticks.iter().all(|t| (t.spread() - 100.0).abs() < 1e-6));
    }

    #[test]
    fn test_channel_message_decodes() {
        let tick = synthetic_ticks(1, DateTime::UNIX_EPOCH, 1).remove(0);
        let decoded = rpc::decode(&channel_message(&tick), BENCH_CHANNEL).unwrap();
        assert_eq!(decoded, Inbound::Tick(tick));
    }
}
