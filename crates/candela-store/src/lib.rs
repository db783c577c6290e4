//! Durable candle storage for the candela tick-to-candle pipeline.
//!
//! Candles are stored in a single SQLite table keyed by
//! `(product_code, duration, bucket start)`:
//!
//! - [`initialize_store`] - Opens the database and creates the schema
//! - [`CandleStore`] - Pooled handle with upsert and range queries
//! - [`QueryLimit`] - Clamped row limit for range queries
//! - [`StoreConfig`] - Database location and pool settings

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod limit;
mod schema;
mod store;

pub use config::{DATABASE_FILE, StoreConfig};
pub use error::{Result, StoreError};
pub use limit::QueryLimit;
pub use store::{CandleStore, initialize_store};
