//! Aggregation task: feeds every tick to every timeline, in order.

use candela_aggregate::{CandleAggregator, Transition};
use candela_store::{CandleStore, StoreError};
use candela_types::{BucketDuration, DurationRegistry, Tick};
use tokio::sync::mpsc;

use crate::{DecisionHook, IngestSummary, StoreRetry};

/// One aggregator per configured duration of one instrument.
pub(crate) struct Timelines {
    aggregators: Vec<CandleAggregator>,
    decision: BucketDuration,
}

impl Timelines {
    pub(crate) fn new(product_code: &str, registry: &DurationRegistry) -> Self {
        Self {
            aggregators: registry
                .durations()
                .into_iter()
                .map(|d| CandleAggregator::new(product_code, d))
                .collect(),
            decision: registry.decision(),
        }
    }
}

/// Applies queued ticks until the queue is closed and drained.
///
/// Blocking: storage calls are synchronous, so this runs on a blocking
/// thread and waits on the queue with `blocking_recv`.
pub(crate) fn consume(
    mut rx: mpsc::Receiver<Tick>,
    mut timelines: Timelines,
    store: &CandleStore,
    hook: &dyn DecisionHook,
    retry: StoreRetry,
) -> IngestSummary {
    let mut summary = IngestSummary::default();

    while let Some(tick) = rx.blocking_recv() {
        summary.ticks += 1;
        tracing::debug!(
            product_code = %tick.product_code,
            tick_id = tick.tick_id,
            timestamp = %tick.timestamp,
            price = tick.price(),
            volume = tick.volume,
            "tick"
        );

        for aggregator in &mut timelines.aggregators {
            let is_decision = aggregator.duration() == timelines.decision;
            match apply_with_retry(aggregator, store, &tick, retry) {
                Ok(transition) => {
                    record(&mut summary, aggregator, &transition);
                    if is_decision {
                        if let Some(closed) = transition.closed() {
                            hook.on_candle_closed(closed);
                        }
                        if transition.is_new_bucket() {
                            hook.on_new_bucket(&tick, true);
                        }
                    }
                }
                Err(e) => {
                    summary.failed_writes += 1;
                    tracing::error!(
                        product_code = %aggregator.product_code(),
                        duration = %aggregator.duration(),
                        bucket = %tick.bucket_start(aggregator.duration()),
                        error = %e,
                        "failed to apply tick"
                    );
                }
            }
        }
    }

    tracing::info!(%summary, "tick queue drained");
    summary
}

fn apply_with_retry(
    aggregator: &mut CandleAggregator,
    store: &CandleStore,
    tick: &Tick,
    retry: StoreRetry,
) -> Result<Transition, StoreError> {
    let mut attempt = 0;
    loop {
        match aggregator.apply(store, tick) {
            Ok(transition) => return Ok(transition),
            Err(e) if attempt < retry.retries => {
                attempt += 1;
                tracing::warn!(
                    duration = %aggregator.duration(),
                    attempt,
                    error = %e,
                    "store write failed, retrying"
                );
                std::thread::sleep(retry.delay);
            }
            Err(e) => return Err(e),
        }
    }
}

fn record(summary: &mut IngestSummary, aggregator: &CandleAggregator, transition: &Transition) {
    if transition.is_new_bucket() {
        summary.candles_opened += 1;
    }
    match transition {
        Transition::Rolled { closed } => {
            summary.candles_closed += 1;
            tracing::info!(
                product_code = %closed.product_code,
                duration = %closed.duration,
                bucket = %closed.time,
                open = closed.open,
                high = closed.high,
                low = closed.low,
                close = closed.close,
                volume = closed.volume,
                "candle closed"
            );
        }
        Transition::Late { bucket, applied } => {
            summary.late_ticks += 1;
            tracing::debug!(
                duration = %aggregator.duration(),
                bucket = %bucket,
                applied,
                "late tick"
            );
        }
        Transition::Resumed => {
            tracing::info!(
                product_code = %aggregator.product_code(),
                duration = %aggregator.duration(),
                "resumed open candle from store"
            );
        }
        Transition::Opened | Transition::Updated => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoopDecisionHook;
    use candela_store::{QueryLimit, StoreConfig, initialize_store};
    use chrono::{DateTime, TimeZone, Utc};
    use std::time::Duration;
    use tempfile::TempDir;

    const REJECT: &str = "
        CREATE TRIGGER reject_insert BEFORE INSERT ON candles WHEN NEW.close = 666.0
        BEGIN SELECT RAISE(ABORT, 'rejected'); END;
        CREATE TRIGGER reject_update BEFORE UPDATE ON candles WHEN NEW.close = 666.0
        BEGIN SELECT RAISE(ABORT, 'rejected'); END;
    ";

    fn at(s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, s).unwrap()
    }

    fn tick(s: u32, price: f64) -> Tick {
        Tick::new("BTC_JPY", at(s), 0.0, 0.0, price, 1.0)
    }

    fn open(dir: &TempDir) -> (CandleStore, rusqlite::Connection) {
        let store = initialize_store(&StoreConfig::at(dir.path().join("candela.db"))).unwrap();
        let conn = rusqlite::Connection::open(store.path()).unwrap();
        conn.busy_timeout(Duration::from_secs(5)).unwrap();
        conn.execute_batch(REJECT).unwrap();
        (store, conn)
    }

    fn timelines() -> Timelines {
        let registry = DurationRegistry::from_labels(["1m"], "1m").unwrap();
        Timelines::new("BTC_JPY", &registry)
    }

    #[test]
    fn test_failed_write_is_counted_and_next_tick_applied() {
        let dir = TempDir::new().unwrap();
        let (store, _conn) = open(&dir);
        let (tx, rx) = mpsc::channel(8);
        for t in [tick(5, 100.0), tick(20, 666.0), tick(40, 110.0)] {
            tx.try_send(t).unwrap();
        }
        drop(tx);

        let retry = StoreRetry {
            retries: 3,
            delay: Duration::from_millis(1),
        };
        let summary = consume(rx, timelines(), &store, &NoopDecisionHook, retry);

        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.failed_writes, 1);
        assert_eq!(summary.candles_opened, 1);
        let series = store
            .query_range("BTC_JPY", BucketDuration::MINUTE, QueryLimit::MAX)
            .unwrap();
        assert_eq!(series.len(), 1);
        let candle = &series.candles[0];
        assert!((candle.high - 110.0).abs() < 1e-10);
        assert!((candle.close - 110.0).abs() < 1e-10);
    }

    #[test]
    fn test_retry_succeeds_once_store_recovers() {
        let dir = TempDir::new().unwrap();
        let (store, conn) = open(&dir);
        let mut aggregator = CandleAggregator::new("BTC_JPY", BucketDuration::MINUTE);

        let release = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            conn.execute_batch("DROP TRIGGER reject_insert; DROP TRIGGER reject_update;")
                .unwrap();
        });
        let retry = StoreRetry {
            retries: 100,
            delay: Duration::from_millis(10),
        };
        let transition = apply_with_retry(&mut aggregator, &store, &tick(5, 666.0), retry).unwrap();
        release.join().unwrap();

        assert_eq!(transition, Transition::Opened);
        assert!((aggregator.current().unwrap().close - 666.0).abs() < 1e-10);
    }

    #[test]
    fn test_retries_exhausted_returns_error() {
        let dir = TempDir::new().unwrap();
        let (store, _conn) = open(&dir);
        let mut aggregator = CandleAggregator::new("BTC_JPY", BucketDuration::MINUTE);
        let retry = StoreRetry {
            retries: 2,
            delay: Duration::ZERO,
        };

        let result = apply_with_retry(&mut aggregator, &store, &tick(5, 666.0), retry);

        assert!(matches!(result, Err(StoreError::Sqlite(_))));
        assert!(aggregator.current().is_none());
    }
}
