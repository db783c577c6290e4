//! CLI command implementations.

pub(crate) mod candles;
pub(crate) mod durations;
pub(crate) mod ingest;
