//! Two-task ingestion pipeline.

use std::sync::Arc;

use candela_feed::TickSource;
use candela_store::CandleStore;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::consumer::{Timelines, consume};
use crate::producer::produce;
use crate::{DecisionHook, IngestConfig, IngestError, IngestSummary, NoopDecisionHook};

/// Runs one tick feed into one aggregator per configured duration.
///
/// A producer task owns the feed subscription and pushes ticks into a
/// bounded queue; a consumer task applies each tick to every aggregator in
/// arrival order and notifies the [`DecisionHook`]. Cancelling stops the
/// feed first, then the consumer drains what is already queued.
pub struct Coordinator {
    config: IngestConfig,
    store: CandleStore,
    hook: Arc<dyn DecisionHook>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Creates a coordinator with a [`NoopDecisionHook`].
    #[must_use]
    pub fn new(config: IngestConfig, store: CandleStore) -> Self {
        Self {
            config,
            store,
            hook: Arc::new(NoopDecisionHook),
        }
    }

    /// Sets the decision hook.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn DecisionHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Runs until `cancel` fires, the feed cannot be re-established, or the
    /// aggregation task fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed exhausted its reconnects or a task
    /// panicked. Ticks queued before the failure are still applied.
    pub async fn run<S>(
        &self,
        source: Arc<S>,
        cancel: CancellationToken,
    ) -> Result<IngestSummary, IngestError>
    where
        S: TickSource + ?Sized + 'static,
    {
        let product_code = self.config.product_code.clone();
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));

        tracing::info!(
            product_code = %product_code,
            durations = ?self.config.registry.iter().map(|(label, _)| label).collect::<Vec<_>>(),
            decision = %self.config.registry.decision(),
            "starting ingestion"
        );

        let producer = tokio::spawn(produce(
            source,
            product_code.clone(),
            self.config.reconnect,
            tx,
            cancel,
        ));

        let timelines = Timelines::new(&product_code, &self.config.registry);
        let store = self.store.clone();
        let hook = Arc::clone(&self.hook);
        let retry = self.config.store_retry;
        let consumer =
            tokio::task::spawn_blocking(move || consume(rx, timelines, &store, hook.as_ref(), retry));

        // The producer owns the only sender; once it returns the consumer
        // sees the queue close after draining it. If the consumer dies first
        // the producer stops on the closed queue.
        let produced = producer.await;
        let mut summary = match consumer.await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(product_code = %product_code, error = %e, "aggregation task failed");
                return Err(e.into());
            }
        };
        match produced? {
            Ok(reconnects) => summary.reconnects = reconnects,
            Err(e) => {
                tracing::error!(product_code = %product_code, %summary, error = %e, "ingestion aborted");
                return Err(e);
            }
        }

        tracing::info!(product_code = %product_code, %summary, "ingestion stopped");
        Ok(summary)
    }
}
