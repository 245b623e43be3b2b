//! Error types for overview bookkeeping and record marshalling.

use thiserror::Error;

/// Errors produced by the tracker, the stores and the marshalling layer.
///
/// A missing overview or series is never an error; lookups return `None`
/// and deletions return `false` or zero instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverviewError {
    /// The caller passed a batch that cannot produce an overview.
    ///
    /// Not retryable: the call itself must be fixed.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// A backing store could not be read or written.
    ///
    /// Propagated unchanged. A retry must re-run the whole
    /// read-merge-write sequence.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An exchange, interval or table name could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A row or record does not match its schema.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// An overview would violate `start <= end`.
    #[error("invalid overview: {0}")]
    InvalidOverview(String),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl OverviewError {
    /// Returns true if the caller may retry the failed operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, OverviewError::StoreUnavailable(_))
    }
}

/// Result alias used throughout the crate.
pub type OverviewResult<T> = Result<T, OverviewError>;
