//! Database connection pooling, schema bootstrap and storage traits.
//!
//! This module provides:
//! - Standardized connection pool creation with a bounded connect phase
//! - Idempotent creation of the watch list and snapshot tables
//! - Storage traits implemented by Postgres and by an in-memory store

pub mod health;
pub mod memory;
pub mod snapshots;
pub mod store;
pub mod watchlist;

pub use health::{ComponentHealth, HealthCheck, HealthReport, Pinger};
pub use memory::MemoryStore;
pub use snapshots::PgSnapshotStore;
pub use store::{SnapshotStore, WatchListStore};
pub use watchlist::PgWatchListStore;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;
use std::time::Duration;

/// Database pool configuration
#[derive(Debug, Clone)]
pub struct DbPoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Timeout for acquiring a connection
    pub acquire_timeout: Duration,
    /// How long idle connections are kept alive
    pub idle_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
}

impl Default for DbPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),   // 5 minutes
            max_lifetime: Duration::from_secs(1800),  // 30 minutes
        }
    }
}

impl DbPoolConfig {
    /// Create config from environment variables with fallback to provided defaults
    pub fn from_env_with_defaults(defaults: Self) -> Self {
        Self {
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_connections),
            acquire_timeout: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
            idle_timeout: env::var("DB_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            max_lifetime: env::var("DB_MAX_LIFETIME_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_lifetime),
        }
    }
}

/// Create a database connection pool and verify it answers `SELECT 1`.
///
/// The whole connect phase is bounded by `connect_timeout`; failure here is
/// fatal for the service.
///
/// # Example
/// ```ignore
/// let config = DbPoolConfig::from_env_with_defaults(DbPoolConfig::default());
/// let pool = create_pool(&database_url, &config, Duration::from_secs(10)).await?;
/// ```
pub async fn create_pool(
    database_url: &str,
    config: &DbPoolConfig,
    connect_timeout: Duration,
) -> Result<PgPool> {
    let connect = async {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .context("Failed to create database connection pool")?;

        health::check_pool_health(&pool).await?;
        Ok::<_, anyhow::Error>(pool)
    };

    let pool = tokio::time::timeout(connect_timeout, connect)
        .await
        .with_context(|| format!("Database connection timed out after {:?}", connect_timeout))??;

    tracing::info!(
        "Database pool created: max={}, min={}, acquire_timeout={}s",
        config.max_connections,
        config.min_connections,
        config.acquire_timeout.as_secs()
    );

    Ok(pool)
}

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS watched_currencies (
        symbol TEXT PRIMARY KEY
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS currency_prices (
        id          BIGSERIAL PRIMARY KEY,
        symbol      TEXT    NOT NULL,
        "timestamp" BIGINT  NOT NULL,
        price       BIGINT  NOT NULL,
        "precision" INTEGER NOT NULL,
        currency    TEXT    NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS currency_prices_symbol_timestamp_idx
        ON currency_prices (symbol, "timestamp")
    "#,
];

/// Create the watch list and snapshot tables if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply database schema")?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbPoolConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_env_defaults_fall_through() {
        let defaults = DbPoolConfig {
            max_connections: 3,
            ..Default::default()
        };
        let config = DbPoolConfig::from_env_with_defaults(defaults);
        assert!(config.max_connections > 0);
        assert!(config.max_lifetime >= Duration::from_secs(1));
    }
}
