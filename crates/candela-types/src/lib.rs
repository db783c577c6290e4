//! Core types for the candela tick-to-candle pipeline.
//!
//! This crate provides the fundamental data structures used throughout candela:
//!
//! - [`Tick`] - A single ticker update from the exchange feed
//! - [`BucketDuration`] - Width of a candle bucket (e.g. `1m`, `1h`)
//! - [`DurationRegistry`] - The configured set of bucket durations
//! - [`Candle`] - OHLCV bar for one bucket of one instrument
//! - [`CandleSeries`] - Ordered candles returned by range queries

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod candle;
mod duration;
mod error;
mod registry;
mod tick;

pub use candle::{Candle, CandleSeries};
pub use duration::{BucketDuration, DurationParseError};
pub use error::RegistryError;
pub use registry::DurationRegistry;
pub use tick::Tick;
