//! Per-duration tick-to-candle aggregation for the candela pipeline.
//!
//! This crate provides the bucket state machine:
//!
//! - [`CandleAggregator`] - Folds ticks into the open candle of one timeline
//! - [`BucketState`] - Whether a bucket is currently open
//! - [`Transition`] - What a tick did to the timeline, including closures

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod transition;

pub use aggregator::{BucketState, CandleAggregator};
pub use transition::Transition;
