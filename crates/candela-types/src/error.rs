//! Error types for candela configuration.

use thiserror::Error;

use crate::{BucketDuration, DurationParseError};

/// Errors raised while building a [`DurationRegistry`](crate::DurationRegistry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No bucket durations were configured.
    #[error("at least one bucket duration must be configured")]
    Empty,

    /// A duration label could not be parsed.
    #[error(transparent)]
    InvalidDuration(#[from] DurationParseError),

    /// The same label was configured twice.
    #[error("duration label '{0}' is configured more than once")]
    DuplicateLabel(String),

    /// The decision duration is not one of the bucketing durations.
    #[error("decision duration {0} is not among the configured bucket durations")]
    DecisionNotRegistered(BucketDuration),
}
