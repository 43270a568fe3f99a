//! price_tracker_rust - watch list API, periodic price ingestion and
//! point-in-time price lookup

pub mod api;
pub mod app;
pub mod config;
pub mod ingestion;
pub mod logging;

pub use app::{AppContext, Bootstrapped};
pub use config::Config;
pub use ingestion::{CoinFailure, IngestSettings, IngestStats, IngestionJob, TickReport};
