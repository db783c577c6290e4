//! Error types for ingestion.

use candela_feed::FeedError;
use candela_types::RegistryError;
use thiserror::Error;

/// Errors that abort an ingestion run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The configured durations are invalid.
    #[error("Invalid duration configuration: {0}")]
    Registry(#[from] RegistryError),

    /// The feed kept failing after every allowed reconnect.
    #[error("Feed unavailable after {attempts} consecutive failures: {source}")]
    FeedExhausted {
        /// Consecutive failed sessions.
        attempts: u32,
        /// The last feed error.
        #[source]
        source: FeedError,
    },

    /// A pipeline task panicked or was aborted.
    #[error("Ingest task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
