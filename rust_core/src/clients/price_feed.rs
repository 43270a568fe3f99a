//! Price Feed Trait
//!
//! Common interface for the external service that publishes the coin
//! catalogue and current prices. The production implementation is
//! [`CoinGeckoClient`](super::coingecko::CoinGeckoClient); tests plug in
//! scripted feeds.

use crate::error::TrackerResult;
use crate::models::{CoinListing, FeedQuote};
use async_trait::async_trait;

/// Source of coin identifiers and current prices
///
/// Implementations must be Send + Sync; every call is expected to be
/// time-bounded by the implementation itself.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Display name for logs (e.g. "CoinGecko")
    fn provider_name(&self) -> &str;

    /// List every coin the feed knows about.
    ///
    /// Called once at startup to build the valid-coin universe.
    async fn list_coins(&self) -> TrackerResult<Vec<CoinListing>>;

    /// Current price of one coin in the reference currency
    ///
    /// # Returns
    /// * `Ok(FeedQuote)` - Latest price
    /// * `Err` - Transport failure, non-2xx status, timeout, or the coin is
    ///   missing from the response
    async fn current_price(&self, coin_id: &str) -> TrackerResult<FeedQuote>;
}
