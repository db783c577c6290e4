//! Run counters.

use std::fmt;

/// Counters of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSummary {
    /// Ticks taken off the hand-off queue.
    pub ticks: u64,
    /// Candles created, across all durations.
    pub candles_opened: u64,
    /// Candles closed by a boundary crossing, across all durations.
    pub candles_closed: u64,
    /// Ticks that arrived for a bucket before the open one.
    pub late_ticks: u64,
    /// Aggregator steps that still failed after retrying.
    pub failed_writes: u64,
    /// Feed sessions re-established after a failure.
    pub reconnects: u64,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, {} candles opened, {} closed, {} late, {} failed writes, {} reconnects",
            self.ticks,
            self.candles_opened,
            self.candles_closed,
            self.late_ticks,
            self.failed_writes,
            self.reconnects
        )
    }
}
