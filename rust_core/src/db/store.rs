//! Storage contracts for the watch list and the snapshot history.
//!
//! Callers pass symbols already normalized (see
//! [`normalize_symbol`](crate::models::normalize_symbol)). Implementations
//! rely on the backing engine for atomicity of single-row operations; there is
//! no application-level locking across operations.

use crate::error::TrackerResult;
use crate::models::PriceSnapshot;
use async_trait::async_trait;

#[async_trait]
pub trait WatchListStore: Send + Sync {
    /// Insert the symbol; no-op if it is already watched
    async fn insert_if_absent(&self, symbol: &str) -> TrackerResult<()>;

    /// Delete the symbol, returning the number of rows removed
    async fn delete(&self, symbol: &str) -> TrackerResult<u64>;

    /// All watched symbols in ascending order
    async fn list_symbols(&self) -> TrackerResult<Vec<String>>;
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Append one snapshot row
    async fn append(&self, snapshot: &PriceSnapshot) -> TrackerResult<()>;

    /// Candidates bracketing `target` for `symbol`.
    ///
    /// Returns at most two rows: the latest snapshot with
    /// `timestamp <= target` and the earliest with `timestamp > target`
    /// (first written wins among equal timestamps). Empty when the symbol
    /// has no snapshots.
    async fn bracketing(&self, symbol: &str, target: i64) -> TrackerResult<Vec<PriceSnapshot>>;
}
