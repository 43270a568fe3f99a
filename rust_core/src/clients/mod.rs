pub mod coingecko;
pub mod price_feed;

// Re-export commonly used types
pub use coingecko::{CoinGeckoClient, CoinGeckoConfig};
pub use price_feed::PriceFeed;
