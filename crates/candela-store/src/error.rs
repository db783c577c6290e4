//! Error types for candle storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the database directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to build the connection pool or check out a connection.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A SQLite statement failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row cannot be represented as a candle.
    #[error("Corrupt candle row for {product_code} at {time_ms}ms: {reason}")]
    CorruptRow {
        /// Instrument of the row.
        product_code: String,
        /// Bucket start of the row, in epoch milliseconds.
        time_ms: i64,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
