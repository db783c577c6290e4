//! Ingestion configuration.

use std::time::Duration;

use candela_feed::ReconnectPolicy;
use candela_types::DurationRegistry;

use crate::IngestError;

/// Retry settings for a failed aggregator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreRetry {
    /// Retries after the first failed attempt.
    pub retries: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for StoreRetry {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(100),
        }
    }
}

/// Configuration of one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Instrument to subscribe to.
    pub product_code: String,
    /// Durations aggregated for the instrument, with the decision duration.
    pub registry: DurationRegistry,
    /// Capacity of the hand-off queue between feed and aggregators.
    pub channel_capacity: usize,
    /// Reconnect policy for the feed.
    pub reconnect: ReconnectPolicy,
    /// Retry policy for failed store writes.
    pub store_retry: StoreRetry,
}

impl IngestConfig {
    /// Default capacity of the hand-off queue.
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

    /// Creates a configuration with default queue and retry settings.
    #[must_use]
    pub fn new(product_code: impl Into<String>, registry: DurationRegistry) -> Self {
        Self {
            product_code: product_code.into(),
            registry,
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            reconnect: ReconnectPolicy::default(),
            store_retry: StoreRetry::default(),
        }
    }

    /// Creates a configuration from duration labels such as `["1m", "1h"]`.
    ///
    /// # Errors
    ///
    /// Returns an error if a label is invalid, the list is empty, or the
    /// decision duration is not one of the labels.
    pub fn from_labels<I, S>(
        product_code: impl Into<String>,
        labels: I,
        decision: &str,
    ) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registry = DurationRegistry::from_labels(labels, decision)?;
        Ok(Self::new(product_code, registry))
    }

    /// Sets the hand-off queue capacity.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the feed reconnect policy.
    #[must_use]
    pub const fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Sets the store retry policy.
    #[must_use]
    pub const fn with_store_retry(mut self, store_retry: StoreRetry) -> Self {
        self.store_retry = store_retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_types::{BucketDuration, RegistryError};

    #[test]
    fn test_from_labels() {
        let config = IngestConfig::from_labels("BTC_JPY", ["1s", "1m", "1h"], "1m").unwrap();
        assert_eq!(config.product_code, "BTC_JPY");
        assert_eq!(config.registry.len(), 3);
        assert_eq!(config.registry.decision(), BucketDuration::MINUTE);
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.store_retry.retries, 3);
    }

    #[test]
    fn test_from_labels_rejects_missing_decision() {
        let err = IngestConfig::from_labels("BTC_JPY", ["1m"], "1h").unwrap_err();
        assert!(matches!(
            err,
            IngestError::Registry(RegistryError::DecisionNotRegistered(_))
        ));
    }

    #[test]
    fn test_from_labels_rejects_empty() {
        let labels: [&str; 0] = [];
        let err = IngestConfig::from_labels("BTC_JPY", labels, "1m").unwrap_err();
        assert!(matches!(err, IngestError::Registry(RegistryError::Empty)));
    }
}
