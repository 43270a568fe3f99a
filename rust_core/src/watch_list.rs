//! Watch list operations with the registry gate applied on add.

use crate::db::WatchListStore;
use crate::error::{TrackerError, TrackerResult};
use crate::models::normalize_symbol;
use crate::registry::CoinRegistry;
use std::sync::Arc;
use tracing::info;

pub struct WatchList {
    store: Arc<dyn WatchListStore>,
    registry: Arc<CoinRegistry>,
}

impl WatchList {
    pub fn new(store: Arc<dyn WatchListStore>, registry: Arc<CoinRegistry>) -> Self {
        Self { store, registry }
    }

    /// Start watching `symbol`. Idempotent; returns the stored form.
    pub async fn add(&self, symbol: &str) -> TrackerResult<String> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(TrackerError::Validation("coin name is required".to_string()));
        }
        if !self.registry.is_valid(&symbol) {
            return Err(TrackerError::Validation(format!("unknown coin '{}'", symbol)));
        }

        self.store.insert_if_absent(&symbol).await?;
        info!(coin = %symbol, "Coin added to watch list");
        Ok(symbol)
    }

    /// Stop watching `symbol`; fails with `CoinNotFound` if it was not watched
    pub async fn remove(&self, symbol: &str) -> TrackerResult<()> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(TrackerError::Validation("coin name is required".to_string()));
        }

        if self.store.delete(&symbol).await? == 0 {
            return Err(TrackerError::CoinNotFound(symbol));
        }

        info!(coin = %symbol, "Coin removed from watch list");
        Ok(())
    }

    pub async fn list_all(&self) -> TrackerResult<Vec<String>> {
        self.store.list_symbols().await
    }
}
