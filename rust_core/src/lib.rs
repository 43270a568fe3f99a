//! Coinwatch Core - price snapshot storage and nearest-timestamp lookup.
//!
//! This crate provides:
//! - Watch list management gated by the price feed's coin universe
//! - Append-only price snapshots stored as fixed-point integers
//! - Nearest-timestamp price resolution
//! - CoinGecko-style price feed client
//! - Postgres and in-memory storage backends with health checks

pub mod clients;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod resolver;
pub mod utils;
pub mod watch_list;

pub use error::{ErrorKind, TrackerError, TrackerResult};
pub use models::{PriceQuery, PriceResult, PriceSnapshot};
pub use registry::CoinRegistry;
pub use resolver::PriceResolver;
pub use watch_list::WatchList;
