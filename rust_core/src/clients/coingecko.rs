//! CoinGecko API Client
//!
//! Provides the coin catalogue (used to build the valid-coin universe) and
//! current USD prices for the ingestion job.

use super::price_feed::PriceFeed;
use crate::db::health::Pinger;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{CoinListing, FeedQuote};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Connection settings for [`CoinGeckoClient`]
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    /// Optional demo/pro key sent as `x-cg-demo-api-key`
    pub api_key: Option<String>,
    /// Deadline for the (large) coin catalogue request
    pub list_timeout: Duration,
    /// Deadline for a single price request
    pub price_timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            list_timeout: Duration::from_secs(30),
            price_timeout: Duration::from_secs(30),
        }
    }
}

/// CoinGecko API client
pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
}

/// Per-coin entry of the `/simple/price` response
#[derive(Debug, Deserialize)]
struct SimplePriceData {
    usd: f64,
    #[serde(default)]
    last_updated_at: Option<i64>,
}

impl CoinGeckoClient {
    /// Create a new CoinGecko client
    pub fn new(config: CoinGeckoConfig) -> TrackerResult<Self> {
        let client = Client::builder()
            .user_agent("coinwatch/0.1")
            .build()?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn get(&self, url: &str, timeout: Duration) -> RequestBuilder {
        let request = self.client.get(url).timeout(timeout);
        match &self.config.api_key {
            Some(key) => request.header("x-cg-demo-api-key", key),
            None => request,
        }
    }

    /// `/simple/price` for one coin; the id goes through query encoding
    fn price_request(&self, url: &str, coin_id: &str) -> RequestBuilder {
        self.get(url, self.config.price_timeout).query(&[
            ("ids", coin_id),
            ("vs_currencies", "usd"),
            ("include_last_updated_at", "true"),
        ])
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> TrackerResult<Response> {
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(TrackerError::FeedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

/// Pull one coin's quote out of a `/simple/price` body
pub(crate) fn parse_simple_price(body: &str, coin_id: &str) -> TrackerResult<FeedQuote> {
    let mut prices: HashMap<String, SimplePriceData> = serde_json::from_str(body)
        .map_err(|e| TrackerError::FeedDecode(e.to_string()))?;

    let data = prices
        .remove(coin_id)
        .ok_or_else(|| TrackerError::FeedDecode(format!("no price for '{}' in response", coin_id)))?;

    Ok(FeedQuote {
        coin_id: coin_id.to_string(),
        price: data.usd,
        last_updated_at: data.last_updated_at,
    })
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    fn provider_name(&self) -> &str {
        "CoinGecko"
    }

    async fn list_coins(&self) -> TrackerResult<Vec<CoinListing>> {
        let url = format!("{}/coins/list", self.base_url());

        debug!("Fetching coin list from CoinGecko");

        let response = self
            .send(self.get(&url, self.config.list_timeout), &url)
            .await?;

        let coins: Vec<CoinListing> = response
            .json()
            .await
            .map_err(|e| TrackerError::FeedDecode(e.to_string()))?;

        Ok(coins)
    }

    async fn current_price(&self, coin_id: &str) -> TrackerResult<FeedQuote> {
        let url = format!("{}/simple/price", self.base_url());

        debug!("Fetching price for {} from CoinGecko", coin_id);

        let response = self
            .send(self.price_request(&url, coin_id), &url)
            .await?;
        let body = response.text().await?;

        parse_simple_price(&body, coin_id)
    }
}

#[async_trait]
impl Pinger for CoinGeckoClient {
    fn name(&self) -> &str {
        "price_feed"
    }

    async fn ping(&self) -> TrackerResult<()> {
        let url = format!("{}/ping", self.base_url());
        self.send(self.get(&url, self.config.price_timeout), &url)
            .await?;
        Ok(())
    }
}
