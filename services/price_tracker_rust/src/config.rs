//! Configuration for price_tracker_rust

use crate::api::{DocsInfo, HttpSettings};
use anyhow::{anyhow, Result};
use coinwatch_core::clients::coingecko::DEFAULT_BASE_URL;
use coinwatch_core::clients::CoinGeckoConfig;
use coinwatch_core::db::DbPoolConfig;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_addr: String,
    pub stage: String,
    pub request_timeout_secs: u64,
    pub cors_allow_origins: Vec<String>,

    // API docs
    pub swagger_title: String,
    pub swagger_description: String,
    pub swagger_version: String,
    pub swagger_base_url: Option<String>,

    // Price feed
    pub price_feed_base_url: String,
    pub price_feed_api_key: Option<String>,
    pub price_feed_list_timeout_secs: u64,
    pub price_feed_price_timeout_secs: u64,

    // Ingestion
    pub ingest_interval_secs: u64,
    pub ingest_concurrency: usize,

    // Database
    pub database_url: String,
    pub db_pool: DbPoolConfig,
    pub db_query_timeout_secs: u64,
    pub db_connect_timeout_secs: u64,

    // Lifecycle
    pub health_check_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow!("DATABASE_URL must be set"))?;
        let docs = DocsInfo::default();

        let config = Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            stage: env::var("APP_STAGE").unwrap_or_else(|_| "development".to_string()),
            request_timeout_secs: parse_u64("REQUEST_TIMEOUT_SECS", 60)?,
            cors_allow_origins: parse_list("CORS_ALLOW_ORIGINS", "*"),

            swagger_title: env::var("SWAGGER_TITLE").unwrap_or(docs.title),
            swagger_description: env::var("SWAGGER_DESCRIPTION").unwrap_or(docs.description),
            swagger_version: env::var("SWAGGER_VERSION").unwrap_or(docs.version),
            swagger_base_url: env::var("SWAGGER_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            price_feed_base_url: env::var("PRICE_FEED_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            price_feed_api_key: env::var("PRICE_FEED_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            price_feed_list_timeout_secs: parse_u64("PRICE_FEED_LIST_TIMEOUT_SECS", 30)?,
            price_feed_price_timeout_secs: parse_u64("PRICE_FEED_PRICE_TIMEOUT_SECS", 30)?,

            ingest_interval_secs: parse_u64("INGEST_INTERVAL_SECS", 30)?,
            ingest_concurrency: parse_usize("INGEST_CONCURRENCY", 1)?,

            database_url,
            db_pool: DbPoolConfig::from_env_with_defaults(DbPoolConfig::default()),
            db_query_timeout_secs: parse_u64("DB_QUERY_TIMEOUT_SECS", 30)?,
            db_connect_timeout_secs: parse_u64("DB_CONNECT_TIMEOUT_SECS", 10)?,

            health_check_timeout_secs: parse_u64("HEALTH_CHECK_TIMEOUT_SECS", 10)?,
            shutdown_timeout_secs: parse_u64("SHUTDOWN_TIMEOUT_SECS", 15)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Every interval, timeout and the fan-out bound must be positive
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
            ("PRICE_FEED_LIST_TIMEOUT_SECS", self.price_feed_list_timeout_secs),
            ("PRICE_FEED_PRICE_TIMEOUT_SECS", self.price_feed_price_timeout_secs),
            ("INGEST_INTERVAL_SECS", self.ingest_interval_secs),
            ("INGEST_CONCURRENCY", self.ingest_concurrency as u64),
            ("DB_QUERY_TIMEOUT_SECS", self.db_query_timeout_secs),
            ("DB_CONNECT_TIMEOUT_SECS", self.db_connect_timeout_secs),
            ("HEALTH_CHECK_TIMEOUT_SECS", self.health_check_timeout_secs),
            ("SHUTDOWN_TIMEOUT_SECS", self.shutdown_timeout_secs),
        ];

        for (name, value) in positive {
            if value == 0 {
                return Err(anyhow!("{} must be > 0", name));
            }
        }

        if self.bind_addr.trim().is_empty() {
            return Err(anyhow!("BIND_ADDR must not be empty"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.stage.eq_ignore_ascii_case("production")
    }

    pub fn feed_config(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.price_feed_base_url.clone(),
            api_key: self.price_feed_api_key.clone(),
            list_timeout: Duration::from_secs(self.price_feed_list_timeout_secs),
            price_timeout: Duration::from_secs(self.price_feed_price_timeout_secs),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            cors_allow_origins: self.cors_allow_origins.clone(),
            request_timeout: self.request_timeout(),
            docs: DocsInfo {
                title: self.swagger_title.clone(),
                description: self.swagger_description.clone(),
                version: self.swagger_version.clone(),
                base_url: self.swagger_base_url.clone(),
            },
        }
    }

    pub fn ingest_interval(&self) -> Duration {
        Duration::from_secs(self.ingest_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn db_query_timeout(&self) -> Duration {
        Duration::from_secs(self.db_query_timeout_secs)
    }

    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Parse environment variable as u64 with default fallback
fn parse_u64(var_name: &str, default: u64) -> Result<u64> {
    match env::var(var_name) {
        Ok(val) => val.trim().parse().map_err(|_| anyhow!("{} must be a valid u64", var_name)),
        Err(_) => Ok(default),
    }
}

/// Parse environment variable as usize with default fallback
fn parse_usize(var_name: &str, default: usize) -> Result<usize> {
    match env::var(var_name) {
        Ok(val) => val.trim().parse().map_err(|_| anyhow!("{} must be a valid usize", var_name)),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list with blanks dropped
fn parse_list(var_name: &str, default: &str) -> Vec<String> {
    env::var(var_name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-mutating tests race each other; keep to unset variables and
    // validate() on hand-built configs.

    fn sample() -> Config {
        Config {
            bind_addr: "127.0.0.1:0".to_string(),
            stage: "test".to_string(),
            request_timeout_secs: 60,
            cors_allow_origins: vec!["*".to_string()],
            swagger_title: "Tracker".to_string(),
            swagger_description: "Prices".to_string(),
            swagger_version: "1.0.0".to_string(),
            swagger_base_url: Some("http://localhost:8080".to_string()),
            price_feed_base_url: DEFAULT_BASE_URL.to_string(),
            price_feed_api_key: None,
            price_feed_list_timeout_secs: 30,
            price_feed_price_timeout_secs: 30,
            ingest_interval_secs: 30,
            ingest_concurrency: 1,
            database_url: "postgres://localhost/coinwatch".to_string(),
            db_pool: DbPoolConfig::default(),
            db_query_timeout_secs: 30,
            db_connect_timeout_secs: 10,
            health_check_timeout_secs: 10,
            shutdown_timeout_secs: 15,
        }
    }

    #[test]
    fn test_parse_u64_with_default() {
        assert_eq!(parse_u64("NON_EXISTENT_VAR_PT_U64", 30).unwrap(), 30);
    }

    #[test]
    fn test_parse_usize_with_default() {
        assert_eq!(parse_usize("NON_EXISTENT_VAR_PT_USIZE", 4).unwrap(), 4);
    }

    #[test]
    fn test_parse_list_default() {
        assert_eq!(parse_list("NON_EXISTENT_VAR_PT_LIST", "a, b,,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            ingest_interval_secs: 0,
            ..sample()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("INGEST_INTERVAL_SECS"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            ingest_concurrency: 0,
            ..sample()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stage_and_durations() {
        let config = Config {
            stage: "Production".to_string(),
            ..sample()
        };
        assert!(config.is_production());
        assert_eq!(config.ingest_interval(), Duration::from_secs(30));
        assert_eq!(config.feed_config().price_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_http_settings_carry_docs_info() {
        let settings = sample().http_settings();
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
        assert_eq!(settings.cors_allow_origins, vec!["*".to_string()]);
        assert_eq!(settings.docs.title, "Tracker");
        assert_eq!(settings.docs.version, "1.0.0");
        assert_eq!(settings.docs.base_url.as_deref(), Some("http://localhost:8080"));
    }
}
