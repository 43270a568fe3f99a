//! Price snapshot database operations
//!
//! Provides append and nearest-candidate queries over the
//! `currency_prices` table.

use super::store::SnapshotStore;
use crate::error::{with_timeout, TrackerError, TrackerResult};
use crate::models::PriceSnapshot;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use tracing::debug;

/// Latest row at or before the target plus earliest row after it. Both arms
/// are served by the `(symbol, "timestamp")` index.
const BRACKETING_QUERY: &str = r#"
    (
        SELECT symbol, "timestamp", price, "precision", currency
        FROM currency_prices
        WHERE symbol = $1 AND "timestamp" <= $2
        ORDER BY "timestamp" DESC, id ASC
        LIMIT 1
    )
    UNION ALL
    (
        SELECT symbol, "timestamp", price, "precision", currency
        FROM currency_prices
        WHERE symbol = $1 AND "timestamp" > $2
        ORDER BY "timestamp" ASC, id ASC
        LIMIT 1
    )
"#;

#[derive(Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgSnapshotStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn append(&self, snapshot: &PriceSnapshot) -> TrackerResult<()> {
        with_timeout("insert price snapshot", self.query_timeout, async {
            sqlx::query(
                r#"
                INSERT INTO currency_prices (symbol, "timestamp", price, "precision", currency)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&snapshot.symbol)
            .bind(snapshot.timestamp)
            .bind(snapshot.scaled_price)
            .bind(snapshot.precision)
            .bind(&snapshot.currency)
            .execute(&self.pool)
            .await?;
            Ok::<_, TrackerError>(())
        })
        .await?;

        debug!(
            "Inserted {} price: {} @ {}",
            snapshot.symbol,
            snapshot.true_price(),
            snapshot.timestamp
        );

        Ok(())
    }

    async fn bracketing(&self, symbol: &str, target: i64) -> TrackerResult<Vec<PriceSnapshot>> {
        with_timeout("select price snapshots", self.query_timeout, async {
            let rows = sqlx::query_as::<_, PriceSnapshot>(BRACKETING_QUERY)
                .bind(symbol)
                .bind(target)
                .fetch_all(&self.pool)
                .await?;
            Ok::<_, TrackerError>(rows)
        })
        .await
    }
}
