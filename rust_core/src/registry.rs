//! Valid-coin universe.
//!
//! Loaded once at startup from the price feed's catalogue and read-only
//! afterwards. Only the add-coin path consults it.

use crate::clients::PriceFeed;
use crate::error::TrackerResult;
use crate::models::normalize_symbol;
use rustc_hash::FxHashSet;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CoinRegistry {
    coins: FxHashSet<String>,
}

impl CoinRegistry {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            coins: ids
                .into_iter()
                .map(|id| normalize_symbol(id.as_ref()))
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    /// Build the universe from the feed's coin catalogue (keyed by coin id)
    pub async fn load(feed: &dyn PriceFeed) -> TrackerResult<Self> {
        let listings = feed.list_coins().await?;
        let registry = Self::from_ids(listings.iter().map(|c| c.id.as_str()));

        info!(
            "Loaded {} valid coins from {}",
            registry.len(),
            feed.provider_name()
        );

        Ok(registry)
    }

    pub fn is_valid(&self, symbol: &str) -> bool {
        self.coins.contains(&normalize_symbol(symbol))
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}
