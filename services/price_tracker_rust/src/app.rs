//! Service wiring: the shared context handed to request handlers and the
//! ingestion scheduler.

use crate::config::Config;
use crate::ingestion::{IngestSettings, IngestionJob};
use anyhow::{Context, Result};
use coinwatch_core::clients::{CoinGeckoClient, PriceFeed};
use coinwatch_core::db::{
    create_pool, ensure_schema, HealthCheck, PgSnapshotStore, PgWatchListStore, Pinger,
    SnapshotStore, WatchListStore,
};
use coinwatch_core::{CoinRegistry, PriceResolver, WatchList};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Everything a request or tick needs. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub watch_list: Arc<WatchList>,
    pub resolver: Arc<PriceResolver>,
    pub ingestion: Arc<IngestionJob>,
    pub health: Arc<HealthCheck>,
}

/// Startup result: the context plus the pool so `main` can close it
pub struct Bootstrapped {
    pub context: AppContext,
    pub pool: PgPool,
}

impl AppContext {
    /// Connect storage, load the coin universe and build the context.
    /// Any failure here is fatal for the process.
    pub async fn bootstrap(config: &Config) -> Result<Bootstrapped> {
        let pool = create_pool(&config.database_url, &config.db_pool, config.db_connect_timeout())
            .await
            .context("Database unavailable at startup")?;
        ensure_schema(&pool).await?;

        let feed = Arc::new(
            CoinGeckoClient::new(config.feed_config()).context("Failed to build price feed client")?,
        );

        let registry = CoinRegistry::load(feed.as_ref())
            .await
            .context("Failed to load coin universe from price feed")?;
        if registry.is_empty() {
            anyhow::bail!("Price feed returned an empty coin universe");
        }

        let query_timeout = config.db_query_timeout();
        let watch_store = Arc::new(PgWatchListStore::new(pool.clone(), query_timeout));
        let snapshot_store = Arc::new(PgSnapshotStore::new(pool.clone(), query_timeout));

        let settings = IngestSettings {
            concurrency: config.ingest_concurrency,
            ..Default::default()
        };

        let pingers = vec![
            Arc::new(pool.clone()) as Arc<dyn Pinger>,
            feed.clone() as Arc<dyn Pinger>,
        ];

        let context = Self::from_parts(
            watch_store,
            snapshot_store,
            feed,
            registry,
            settings,
            HealthCheck::new(pingers, config.health_check_timeout()),
        );

        info!("Service context ready");
        Ok(Bootstrapped { context, pool })
    }

    /// Assemble a context from already-built collaborators
    pub fn from_parts(
        watch_store: Arc<dyn WatchListStore>,
        snapshot_store: Arc<dyn SnapshotStore>,
        feed: Arc<dyn PriceFeed>,
        registry: CoinRegistry,
        settings: IngestSettings,
        health: HealthCheck,
    ) -> Self {
        let registry = Arc::new(registry);

        Self {
            watch_list: Arc::new(WatchList::new(watch_store.clone(), registry)),
            resolver: Arc::new(PriceResolver::new(snapshot_store.clone())),
            ingestion: Arc::new(IngestionJob::new(watch_store, snapshot_store, feed, settings)),
            health: Arc::new(health),
        }
    }
}
