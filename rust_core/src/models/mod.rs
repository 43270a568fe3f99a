// Shared models for the coinwatch services
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::price_scale;

/// Decimal digits kept when scaling feed prices for storage
pub const DEFAULT_PRECISION: i32 = 8;

/// Reporting currency stamped on every stored snapshot
pub const DEFAULT_CURRENCY: &str = "USD";

/// Canonical form of a coin symbol: trimmed and lowercased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}

// ============================================================================
// Price snapshots
// ============================================================================

/// One persisted price observation. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceSnapshot {
    pub symbol: String,
    /// Epoch seconds captured when the row was written
    pub timestamp: i64,
    #[sqlx(rename = "price")]
    pub scaled_price: i64,
    pub precision: i32,
    pub currency: String,
}

impl PriceSnapshot {
    /// Build a snapshot from a decimal price, scaling it with `precision`
    pub fn from_price(
        symbol: &str,
        timestamp: i64,
        price: f64,
        precision: i32,
        currency: &str,
    ) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            timestamp,
            scaled_price: price_scale::encode(price, precision),
            precision,
            currency: currency.to_string(),
        }
    }

    /// Decimal price using this row's own precision
    pub fn true_price(&self) -> f64 {
        price_scale::decode(self.scaled_price, self.precision)
    }

    pub fn distance_to(&self, target: i64) -> u64 {
        self.timestamp.abs_diff(target)
    }
}

// ============================================================================
// Lookup request / response
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceQuery {
    #[schema(example = "bitcoin")]
    pub coin: String,
    /// Unix seconds
    #[schema(example = 1711356300)]
    pub timestamp: i64,
}

impl PriceQuery {
    pub fn new(coin: impl Into<String>, timestamp: i64) -> Self {
        Self {
            coin: coin.into(),
            timestamp,
        }
    }
}

/// Resolved price. `timestamp` is the matched snapshot's, not the query's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceResult {
    pub coin: String,
    pub price: f64,
    pub currency: String,
    pub timestamp: i64,
}

impl From<&PriceSnapshot> for PriceResult {
    fn from(snapshot: &PriceSnapshot) -> Self {
        Self {
            coin: snapshot.symbol.clone(),
            price: snapshot.true_price(),
            currency: snapshot.currency.clone(),
            timestamp: snapshot.timestamp,
        }
    }
}

// ============================================================================
// Feed data
// ============================================================================

/// Current price reported by the external feed for one coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedQuote {
    pub coin_id: String,
    /// Price in the feed's reference currency (USD)
    pub price: f64,
    /// Provider-side update time; informational only
    pub last_updated_at: Option<i64>,
}

/// Entry of the feed's coin catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinListing {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("Bitcoin"), "bitcoin");
        assert_eq!(normalize_symbol("  BITCOIN "), "bitcoin");
        assert_eq!(normalize_symbol("avalanche-2"), "avalanche-2");
    }

    #[test]
    fn test_snapshot_from_price_scales_and_normalizes() {
        let snapshot = PriceSnapshot::from_price("ETH", 1_700_000_000, 2150.125, 8, DEFAULT_CURRENCY);
        assert_eq!(snapshot.symbol, "eth");
        assert_eq!(snapshot.scaled_price, 215_012_500_000);
        assert_eq!(snapshot.true_price(), 2150.125);
        assert_eq!(snapshot.currency, "USD");
    }

    #[test]
    fn test_price_result_uses_row_precision() {
        let snapshot = PriceSnapshot {
            symbol: "bitcoin".to_string(),
            timestamp: 300,
            scaled_price: 12345,
            precision: 2,
            currency: "USD".to_string(),
        };
        let result = PriceResult::from(&snapshot);
        assert_eq!(result.price, 123.45);
        assert_eq!(result.timestamp, 300);
    }

    #[test]
    fn test_distance_to() {
        let snapshot = PriceSnapshot::from_price("btc", 100, 1.0, 8, "USD");
        assert_eq!(snapshot.distance_to(250), 150);
        assert_eq!(snapshot.distance_to(40), 60);
        assert_eq!(snapshot.distance_to(100), 0);
    }
}
