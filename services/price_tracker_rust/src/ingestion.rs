//! Periodic price ingestion.
//!
//! Each tick lists the watch list, fetches a current quote per coin and
//! appends one snapshot per coin. Coins are independent failure domains: a
//! failed fetch or write is logged and the tick moves on. Only a failure to
//! list the watch list aborts a tick.
//!
//! Ticks never overlap. The scheduler runs each tick inline on a fixed grid
//! of deadlines `start + k * period`. Deadlines that pass while a tick is
//! still running are skipped and counted; the next tick waits for the next
//! deadline still in the future.

use chrono::Utc;
use coinwatch_core::clients::PriceFeed;
use coinwatch_core::db::{SnapshotStore, WatchListStore};
use coinwatch_core::error::TrackerError;
use coinwatch_core::models::{PriceSnapshot, DEFAULT_CURRENCY, DEFAULT_PRECISION};
use futures_util::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// Write policy applied to every snapshot
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub precision: i32,
    pub currency: String,
    /// Maximum coins fetched at once within a tick
    pub concurrency: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            currency: DEFAULT_CURRENCY.to_string(),
            concurrency: 1,
        }
    }
}

/// Running counters across all ticks
#[derive(Debug, Default)]
pub struct IngestStats {
    pub ticks_run: AtomicU64,
    pub ticks_aborted: AtomicU64,
    pub ticks_skipped: AtomicU64,
    pub snapshots_stored: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub store_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestStatsSnapshot {
    pub ticks_run: u64,
    pub ticks_aborted: u64,
    pub ticks_skipped: u64,
    pub snapshots_stored: u64,
    pub fetch_failures: u64,
    pub store_failures: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> IngestStatsSnapshot {
        IngestStatsSnapshot {
            ticks_run: self.ticks_run.load(Ordering::Relaxed),
            ticks_aborted: self.ticks_aborted.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            snapshots_stored: self.snapshots_stored.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }

    /// Count one coin's outcome as soon as it is known
    fn record_coin(&self, outcome: &Result<PriceSnapshot, CoinFailure>) {
        let counter = match outcome {
            Ok(_) => &self.snapshots_stored,
            Err(CoinFailure::Fetch(_)) => &self.fetch_failures,
            Err(CoinFailure::Store(_)) => &self.store_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub listed: usize,
    pub stored: usize,
    /// Symbols whose feed fetch failed, in completion order
    pub fetch_failures: Vec<String>,
    /// Symbols whose snapshot write failed, in completion order
    pub store_failures: Vec<String>,
    /// Watch list could not be read; nothing was fetched
    pub aborted: bool,
}

/// Why a single coin was skipped
#[derive(Debug, Error)]
pub enum CoinFailure {
    #[error("fetch failed: {0}")]
    Fetch(TrackerError),
    #[error("store failed: {0}")]
    Store(TrackerError),
}

pub struct IngestionJob {
    watch_list: Arc<dyn WatchListStore>,
    snapshots: Arc<dyn SnapshotStore>,
    feed: Arc<dyn PriceFeed>,
    settings: IngestSettings,
    stats: Arc<IngestStats>,
}

impl IngestionJob {
    pub fn new(
        watch_list: Arc<dyn WatchListStore>,
        snapshots: Arc<dyn SnapshotStore>,
        feed: Arc<dyn PriceFeed>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            watch_list,
            snapshots,
            feed,
            settings,
            stats: Arc::new(IngestStats::new()),
        }
    }

    pub fn stats(&self) -> Arc<IngestStats> {
        self.stats.clone()
    }

    /// Run one tick. Never fails; problems are reported in the `TickReport`.
    pub async fn run_tick(&self) -> TickReport {
        let mut report = TickReport::default();
        self.stats.ticks_run.fetch_add(1, Ordering::Relaxed);

        let symbols = match self.watch_list.list_symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!("Ingestion tick aborted, watch list unavailable: {}", e);
                self.stats.ticks_aborted.fetch_add(1, Ordering::Relaxed);
                report.aborted = true;
                return report;
            }
        };

        report.listed = symbols.len();
        let results: Vec<(String, Result<PriceSnapshot, CoinFailure>)> = stream::iter(symbols)
            .map(|symbol| async move {
                let result = self.ingest_coin(&symbol).await;
                if let Err(failure) = &result {
                    warn!(coin = %symbol, "Skipping coin this tick: {}", failure);
                }
                self.stats.record_coin(&result);
                (symbol, result)
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        for (symbol, result) in results {
            match result {
                Ok(_) => report.stored += 1,
                Err(CoinFailure::Fetch(_)) => report.fetch_failures.push(symbol),
                Err(CoinFailure::Store(_)) => report.store_failures.push(symbol),
            }
        }

        report
    }

    /// Fetch and persist one coin. The stored timestamp is taken at write
    /// time; the feed's own update time is ignored.
    pub async fn ingest_coin(&self, symbol: &str) -> Result<PriceSnapshot, CoinFailure> {
        let quote = self
            .feed
            .current_price(symbol)
            .await
            .map_err(CoinFailure::Fetch)?;

        let snapshot = PriceSnapshot::from_price(
            symbol,
            Utc::now().timestamp(),
            quote.price,
            self.settings.precision,
            &self.settings.currency,
        );
        self.snapshots
            .append(&snapshot)
            .await
            .map_err(CoinFailure::Store)?;

        debug!(coin = %symbol, price = quote.price, "Stored price snapshot");
        Ok(snapshot)
    }

    /// Drive ticks every `period` until `shutdown` flips to true or its
    /// sender is dropped. The first tick fires one period after start. An
    /// in-flight tick is cancelled on shutdown.
    pub async fn run_scheduled(self: Arc<Self>, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut deadline = Instant::now() + period;

        info!("Ingestion scheduler started (interval: {}s)", period.as_secs_f64());

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = sleep_until(deadline) => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                report = self.run_tick() => {
                    if !report.aborted {
                        info!(
                            "Ingestion tick: listed={}, stored={}, fetch_failures={}, store_failures={}",
                            report.listed,
                            report.stored,
                            report.fetch_failures.len(),
                            report.store_failures.len()
                        );
                    }
                }
                _ = shutdown.changed() => {
                    warn!("Shutdown during ingestion tick, cancelling");
                    break;
                }
            }

            let finished = Instant::now();
            let (next, skipped) = next_deadline(deadline, finished, period);
            if skipped > 0 {
                self.stats.ticks_skipped.fetch_add(skipped, Ordering::Relaxed);
                warn!(
                    "Ingestion tick took {:?}, skipping {} overlapping tick(s)",
                    finished.saturating_duration_since(deadline),
                    skipped
                );
            }
            deadline = next;
        }

        let stats = self.stats.snapshot();
        info!(
            "Ingestion scheduler stopped: ticks={}, aborted={}, skipped={}, stored={}, fetch_failures={}, store_failures={}",
            stats.ticks_run,
            stats.ticks_aborted,
            stats.ticks_skipped,
            stats.snapshots_stored,
            stats.fetch_failures,
            stats.store_failures
        );
    }
}

/// Next deadline on the `deadline + k * period` grid that is still ahead of
/// `now`, plus the number of grid deadlines in between that will never run.
fn next_deadline(deadline: Instant, now: Instant, period: Duration) -> (Instant, u64) {
    if period.is_zero() {
        return (now, 0);
    }

    let overrun = now.saturating_duration_since(deadline);
    let skipped = (overrun.as_nanos() / period.as_nanos()) as u64;
    let steps = u32::try_from(skipped + 1).unwrap_or(u32::MAX);

    (deadline + period.saturating_mul(steps), skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_deadline_on_time_tick() {
        let period = Duration::from_secs(30);
        let deadline = Instant::now();

        let (next, skipped) = next_deadline(deadline, deadline + Duration::from_secs(5), period);
        assert_eq!(next, deadline + period);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_next_deadline_skips_passed_slots() {
        let period = Duration::from_millis(500);
        let deadline = Instant::now();

        // Tick started at 500ms and ran 1250ms: the 1000ms and 1500ms slots
        // never run, the next one is 2000ms
        let (next, skipped) = next_deadline(deadline, deadline + Duration::from_millis(1250), period);
        assert_eq!(next, deadline + Duration::from_millis(1500));
        assert_eq!(skipped, 2);

        let (next, skipped) = next_deadline(deadline, deadline + Duration::from_millis(700), period);
        assert_eq!(next, deadline + Duration::from_millis(1000));
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_default_settings() {
        let settings = IngestSettings::default();
        assert_eq!(settings.precision, 8);
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.concurrency, 1);
    }

    #[test]
    fn test_stats_record_coin() {
        let stats = IngestStats::new();
        let stored = PriceSnapshot::from_price("a", 100, 1.0, DEFAULT_PRECISION, DEFAULT_CURRENCY);
        stats.record_coin(&Ok(stored.clone()));
        stats.record_coin(&Ok(stored));
        stats.record_coin(&Err(CoinFailure::Fetch(TrackerError::FeedDecode("x".into()))));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.snapshots_stored, 2);
        assert_eq!(snapshot.fetch_failures, 1);
        assert_eq!(snapshot.store_failures, 0);
        assert_eq!(snapshot.ticks_run, 0);
    }
}
