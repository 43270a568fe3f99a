//! In-process store implementing both storage traits.
//!
//! Used by the test suites and for running the service without Postgres.
//! Snapshots are kept per symbol in write order, so "first written" is the
//! lowest index.

use super::health::Pinger;
use super::store::{SnapshotStore, WatchListStore};
use crate::error::TrackerResult;
use crate::models::PriceSnapshot;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

#[derive(Default)]
pub struct MemoryStore {
    coins: RwLock<BTreeSet<String>>,
    snapshots: RwLock<HashMap<String, Vec<PriceSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every snapshot stored for `symbol`, in write order
    pub fn snapshots_for(&self, symbol: &str) -> Vec<PriceSnapshot> {
        self.snapshots
            .read()
            .get(symbol)
            .cloned()
            .unwrap_or_default()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.read().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl WatchListStore for MemoryStore {
    async fn insert_if_absent(&self, symbol: &str) -> TrackerResult<()> {
        self.coins.write().insert(symbol.to_string());
        Ok(())
    }

    async fn delete(&self, symbol: &str) -> TrackerResult<u64> {
        Ok(u64::from(self.coins.write().remove(symbol)))
    }

    async fn list_symbols(&self) -> TrackerResult<Vec<String>> {
        Ok(self.coins.read().iter().cloned().collect())
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn append(&self, snapshot: &PriceSnapshot) -> TrackerResult<()> {
        self.snapshots
            .write()
            .entry(snapshot.symbol.clone())
            .or_default()
            .push(snapshot.clone());
        Ok(())
    }

    async fn bracketing(&self, symbol: &str, target: i64) -> TrackerResult<Vec<PriceSnapshot>> {
        let snapshots = self.snapshots.read();
        let Some(rows) = snapshots.get(symbol) else {
            return Ok(Vec::new());
        };

        // Strict comparisons keep the first-written row among equal timestamps
        let mut floor: Option<&PriceSnapshot> = None;
        let mut ceil: Option<&PriceSnapshot> = None;
        for row in rows {
            if row.timestamp <= target {
                if floor.map_or(true, |f| row.timestamp > f.timestamp) {
                    floor = Some(row);
                }
            } else if ceil.map_or(true, |c| row.timestamp < c.timestamp) {
                ceil = Some(row);
            }
        }

        Ok(floor.into_iter().chain(ceil).cloned().collect())
    }
}

#[async_trait]
impl Pinger for MemoryStore {
    fn name(&self) -> &str {
        "memory_store"
    }

    async fn ping(&self) -> TrackerResult<()> {
        Ok(())
    }
}
