//! Error taxonomy shared by the storage, feed and lookup layers.

use std::time::Duration;
use thiserror::Error;

/// Result alias used across the core crate
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Caller supplied malformed or missing input, or an unknown coin on add
    #[error("invalid input: {0}")]
    Validation(String),

    /// Remove on a symbol that is not on the watch list
    #[error("coin '{0}' is not on the watch list")]
    CoinNotFound(String),

    /// Lookup for a symbol with zero stored snapshots
    #[error("no price snapshots for '{0}'")]
    PriceNotFound(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("price feed request failed: {0}")]
    FeedTransport(#[from] reqwest::Error),

    #[error("price feed returned status {status} for {url}")]
    FeedStatus { status: u16, url: String },

    #[error("price feed response malformed: {0}")]
    FeedDecode(String),
}

/// Coarse classification used by the HTTP layer and the ingestion job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transient,
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::CoinNotFound(_) | Self::PriceNotFound(_) => ErrorKind::NotFound,
            Self::Timeout { .. }
            | Self::Storage(_)
            | Self::FeedTransport(_)
            | Self::FeedStatus { .. }
            | Self::FeedDecode(_) => ErrorKind::Transient,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Run `fut` under a deadline, mapping expiry to [`TrackerError::Timeout`].
pub async fn with_timeout<T, F>(operation: &'static str, timeout: Duration, fut: F) -> TrackerResult<T>
where
    F: std::future::Future<Output = TrackerResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(TrackerError::Timeout { operation, timeout }),
    }
}
