//! OpenAPI document and the Swagger UI that serves it.

use super::handlers::{self, CoinData, CoinRequest};
use super::response::{ApiStatus, CoinEnvelope, HealthEnvelope, PriceEnvelope};
use coinwatch_core::db::{ComponentHealth, HealthReport};
use coinwatch_core::{PriceQuery, PriceResult};
use utoipa::openapi::{OpenApi as OpenApiDoc, Server};
use utoipa::OpenApi;

pub const SWAGGER_PATH: &str = "/swagger";
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::add_coin,
        handlers::remove_coin,
        handlers::get_price
    ),
    components(schemas(
        CoinRequest,
        CoinData,
        PriceQuery,
        PriceResult,
        HealthReport,
        ComponentHealth,
        ApiStatus,
        CoinEnvelope,
        PriceEnvelope,
        HealthEnvelope
    )),
    tags(
        (name = "currency", description = "Watch list and nearest-timestamp price lookup"),
        (name = "health", description = "Storage and price feed reachability")
    )
)]
struct ApiDoc;

/// Header fields of the published document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsInfo {
    pub title: String,
    pub description: String,
    pub version: String,
    /// Advertised as the only server when set
    pub base_url: Option<String>,
}

impl Default for DocsInfo {
    fn default() -> Self {
        Self {
            title: "Coinwatch Price Tracker API".to_string(),
            description: "Manage watched coins and look up the stored price nearest to a timestamp"
                .to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            base_url: None,
        }
    }
}

pub fn openapi(info: &DocsInfo) -> OpenApiDoc {
    let mut doc = ApiDoc::openapi();
    doc.info.title = info.title.clone();
    doc.info.description = Some(info.description.clone());
    doc.info.version = info.version.clone();
    doc.servers = info.base_url.as_ref().map(|url| vec![Server::new(url)]);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = openapi(&DocsInfo::default());
        for path in [
            "/healthz",
            "/api/v1/currency/add",
            "/api/v1/currency/remove",
            "/api/v1/currency/price",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc.servers.is_none());
    }

    #[test]
    fn test_document_uses_configured_info() {
        let info = DocsInfo {
            title: "Tracker".to_string(),
            description: "Prices".to_string(),
            version: "2.0.0".to_string(),
            base_url: Some("https://tracker.example.com".to_string()),
        };
        let doc = openapi(&info);

        assert_eq!(doc.info.title, "Tracker");
        assert_eq!(doc.info.description.as_deref(), Some("Prices"));
        assert_eq!(doc.info.version, "2.0.0");
        let servers = doc.servers.unwrap();
        assert_eq!(servers[0].url, "https://tracker.example.com");
    }
}
