//! Nearest-timestamp price lookup.
//!
//! An exact timestamp match wins; otherwise the snapshot with the smallest
//! `|timestamp - target|`. Equal distances resolve to the earlier snapshot.

use crate::db::SnapshotStore;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{normalize_symbol, PriceQuery, PriceResult, PriceSnapshot};
use std::sync::Arc;
use tracing::debug;

/// Pick the snapshot closest to `target`.
///
/// Ties go to the earlier timestamp, then to the earlier position in
/// `candidates`.
pub fn select_nearest(candidates: &[PriceSnapshot], target: i64) -> Option<&PriceSnapshot> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(idx, s)| (s.distance_to(target), s.timestamp, *idx))
        .map(|(_, s)| s)
}

pub struct PriceResolver {
    store: Arc<dyn SnapshotStore>,
}

impl PriceResolver {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, query: &PriceQuery) -> TrackerResult<PriceResult> {
        let symbol = normalize_symbol(&query.coin);
        if symbol.is_empty() || query.timestamp <= 0 {
            return Err(TrackerError::Validation(
                "coin and a positive timestamp are required".to_string(),
            ));
        }

        let candidates = self.store.bracketing(&symbol, query.timestamp).await?;
        let matched = select_nearest(&candidates, query.timestamp)
            .ok_or_else(|| TrackerError::PriceNotFound(symbol.clone()))?;

        debug!(
            coin = %symbol,
            requested = query.timestamp,
            matched = matched.timestamp,
            "Resolved price snapshot"
        );

        Ok(PriceResult::from(matched))
    }
}
