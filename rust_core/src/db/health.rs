//! Dependency health checks
//!
//! A [`HealthCheck`] holds an explicit list of [`Pinger`] capabilities (the
//! database pool, the price feed) and aggregates their results.

use crate::error::{with_timeout, TrackerResult};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use utoipa::ToSchema;

/// Something that can answer "are you reachable?"
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Component name reported in health output
    fn name(&self) -> &str;

    async fn ping(&self) -> TrackerResult<()>;
}

/// Check if database pool is healthy
pub async fn check_pool_health(pool: &PgPool) -> TrackerResult<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

#[async_trait]
impl Pinger for PgPool {
    fn name(&self) -> &str {
        "database"
    }

    async fn ping(&self) -> TrackerResult<()> {
        check_pool_health(self).await
    }
}

/// Result of pinging one component
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated health of every registered component
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthReport {
    pub healthy: bool,
    pub components: Vec<ComponentHealth>,
}

pub struct HealthCheck {
    pingers: Vec<Arc<dyn Pinger>>,
    timeout: Duration,
}

impl HealthCheck {
    pub fn new(pingers: Vec<Arc<dyn Pinger>>, timeout: Duration) -> Self {
        Self { pingers, timeout }
    }

    /// Ping every component in order; each ping is bounded by the timeout
    pub async fn check(&self) -> HealthReport {
        let mut components = Vec::with_capacity(self.pingers.len());

        for pinger in &self.pingers {
            let result = with_timeout("health ping", self.timeout, pinger.ping()).await;
            let error = match result {
                Ok(()) => None,
                Err(e) => {
                    error!(component = pinger.name(), "Health check failed: {}", e);
                    Some(e.to_string())
                }
            };

            components.push(ComponentHealth {
                name: pinger.name().to_string(),
                healthy: error.is_none(),
                error,
            });
        }

        HealthReport {
            healthy: components.iter().all(|c| c.healthy),
            components,
        }
    }
}
