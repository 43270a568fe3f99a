//! Watched coin database operations
//!
//! Backed by the `watched_currencies` table; the primary key on `symbol`
//! gives insert-or-ignore semantics.

use super::store::WatchListStore;
use crate::error::{with_timeout, TrackerError, TrackerResult};
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct PgWatchListStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgWatchListStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl WatchListStore for PgWatchListStore {
    async fn insert_if_absent(&self, symbol: &str) -> TrackerResult<()> {
        with_timeout("insert watched coin", self.query_timeout, async {
            sqlx::query("INSERT INTO watched_currencies (symbol) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(symbol)
                .execute(&self.pool)
                .await?;
            Ok::<_, TrackerError>(())
        })
        .await?;

        debug!("Watching {}", symbol);
        Ok(())
    }

    async fn delete(&self, symbol: &str) -> TrackerResult<u64> {
        with_timeout("delete watched coin", self.query_timeout, async {
            let result = sqlx::query("DELETE FROM watched_currencies WHERE symbol = $1")
                .bind(symbol)
                .execute(&self.pool)
                .await?;
            Ok::<_, TrackerError>(result.rows_affected())
        })
        .await
    }

    async fn list_symbols(&self) -> TrackerResult<Vec<String>> {
        with_timeout("list watched coins", self.query_timeout, async {
            let symbols = sqlx::query_scalar::<_, String>(
                "SELECT symbol FROM watched_currencies ORDER BY symbol",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, TrackerError>(symbols)
        })
        .await
    }
}
