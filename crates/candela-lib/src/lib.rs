//! Realtime exchange ticks aggregated into multi-duration OHLCV candles.
//!
//! This is a facade crate that re-exports functionality from the candela
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use candela_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = initialize_store(&StoreConfig::default())?;
//!     let config = IngestConfig::from_labels("BTC_JPY", ["1s", "1m", "1h"], "1m")?;
//!     let cancel = CancellationToken::new();
//!
//!     let summary = Coordinator::new(config, store.clone())
//!         .run(Arc::new(FeedClient::default()), cancel)
//!         .await?;
//!     println!("{summary}");
//!
//!     let series = store.query_range("BTC_JPY", BucketDuration::MINUTE, QueryLimit::new(100))?;
//!     println!("{} candles", series.len());
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use candela_types::*;

// Re-export the feed client
#[cfg(feature = "feed")]
pub use candela_feed::{
    DEFAULT_ENDPOINT, DEFAULT_TOPIC_PREFIX, DecodeError, FeedClient, FeedConfig, FeedError,
    Inbound, ReconnectPolicy, TickSource, TickStream, rpc, tick_stream,
};

// Re-export storage
#[cfg(feature = "store")]
pub use candela_store::{CandleStore, QueryLimit, StoreConfig, StoreError, initialize_store};

// Re-export aggregation
#[cfg(feature = "aggregate")]
pub use candela_aggregate::{BucketState, CandleAggregator, Transition};

// Re-export the coordinator
#[cfg(feature = "ingest")]
pub use candela_ingest::{
    CancellationToken, Coordinator, DecisionHook, IngestConfig, IngestError, IngestSummary,
    NoopDecisionHook, StoreRetry,
};

/// Prelude module for convenient imports.
///
/// ```
/// use candela_lib::prelude::*;
/// ```
pub mod prelude {
    pub use candela_types::{BucketDuration, Candle, CandleSeries, DurationRegistry, Tick};

    #[cfg(feature = "feed")]
    pub use candela_feed::{FeedClient, FeedConfig, ReconnectPolicy, TickSource};

    #[cfg(feature = "store")]
    pub use candela_store::{CandleStore, QueryLimit, StoreConfig, initialize_store};

    #[cfg(feature = "aggregate")]
    pub use candela_aggregate::{CandleAggregator, Transition};

    #[cfg(feature = "ingest")]
    pub use candela_ingest::{
        CancellationToken, Coordinator, DecisionHook, IngestConfig, IngestSummary,
        NoopDecisionHook,
    };
}
