//! Trade-decision extension point.

use candela_types::{Candle, Tick};

/// Receives bucket events for the registry's decision duration.
///
/// Called synchronously from the aggregation task, in tick order, so
/// implementations should return quickly and hand heavy work elsewhere.
pub trait DecisionHook: Send + Sync {
    /// Called when `tick` opened a new candle of the decision duration.
    fn on_new_bucket(&self, tick: &Tick, is_new_bucket: bool);

    /// Called when a candle of the decision duration was closed.
    fn on_candle_closed(&self, _candle: &Candle) {}
}

/// A hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDecisionHook;

impl DecisionHook for NoopDecisionHook {
    fn on_new_bucket(&self, _tick: &Tick, _is_new_bucket: bool) {}
}
