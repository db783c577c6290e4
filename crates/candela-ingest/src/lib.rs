//! Ingestion coordinator for the candela tick-to-candle pipeline.
//!
//! Wires one live tick feed to one aggregator per configured duration:
//!
//! - [`Coordinator`] - Runs the producer and consumer tasks until cancelled
//! - [`IngestConfig`] - Instrument, durations, queue and retry settings
//! - [`DecisionHook`] - Extension point invoked on new decision-duration buckets
//! - [`IngestSummary`] - Counters reported when a run ends

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod consumer;
mod coordinator;
mod error;
mod hook;
mod producer;
mod summary;

pub use config::{IngestConfig, StoreRetry};
pub use coordinator::Coordinator;
pub use error::IngestError;
pub use hook::{DecisionHook, NoopDecisionHook};
pub use summary::IngestSummary;
pub use tokio_util::sync::CancellationToken;
