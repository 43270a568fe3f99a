//! HTTP surface tests driving the router in-process.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use coinwatch_core::clients::PriceFeed;
use coinwatch_core::db::{HealthCheck, MemoryStore, Pinger, SnapshotStore, WatchListStore};
use coinwatch_core::error::{TrackerError, TrackerResult};
use coinwatch_core::models::{CoinListing, FeedQuote, PriceSnapshot};
use coinwatch_core::CoinRegistry;
use price_tracker_rust::api::{DocsInfo, HttpSettings};
use price_tracker_rust::{api, AppContext, IngestSettings};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct StaticFeed;

#[async_trait]
impl PriceFeed for StaticFeed {
    fn provider_name(&self) -> &str {
        "static"
    }

    async fn list_coins(&self) -> TrackerResult<Vec<CoinListing>> {
        Ok(Vec::new())
    }

    async fn current_price(&self, coin_id: &str) -> TrackerResult<FeedQuote> {
        Ok(FeedQuote {
            coin_id: coin_id.to_string(),
            price: 1.0,
            last_updated_at: None,
        })
    }
}

struct DownPinger;

#[async_trait]
impl Pinger for DownPinger {
    fn name(&self) -> &str {
        "price_feed"
    }

    async fn ping(&self) -> TrackerResult<()> {
        Err(TrackerError::FeedStatus {
            status: 503,
            url: "http://feed/ping".to_string(),
        })
    }
}

fn app_with(store: Arc<MemoryStore>, pingers: Vec<Arc<dyn Pinger>>) -> Router {
    let context = AppContext::from_parts(
        store.clone(),
        store,
        Arc::new(StaticFeed),
        CoinRegistry::from_ids(["bitcoin", "ethereum"]),
        IngestSettings::default(),
        HealthCheck::new(pingers, Duration::from_secs(1)),
    );
    let settings = HttpSettings {
        request_timeout: Duration::from_secs(5),
        docs: DocsInfo {
            title: "Coinwatch test API".to_string(),
            base_url: Some("http://tracker.test".to_string()),
            ..DocsInfo::default()
        },
        ..HttpSettings::default()
    };
    api::router(context, &settings)
}

fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let pingers = vec![store.clone() as Arc<dyn Pinger>];
    (app_with(store.clone(), pingers), store)
}

async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_add_coin_normalizes() {
    let (app, store) = app();

    let (status, body) =
        send(app.clone(), "POST", "/api/v1/currency/add", r#"{"name_coin":"Bitcoin"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["data"]["name_coin"], "bitcoin");

    let (status, body) = send(app, "POST", "/api/v1/currency/add", r#"{"name_coin":" BITCOIN "}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name_coin"], "bitcoin");

    assert_eq!(store.list_symbols().await.unwrap(), vec!["bitcoin".to_string()]);
}

#[tokio::test]
async fn test_add_unknown_coin_is_bad_request() {
    let (app, _) = app();

    let (status, body) = send(app, "POST", "/api/v1/currency/add", r#"{"name_coin":"notacoin"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _) = app();

    let (status, body) = send(app, "POST", "/api/v1/currency/add", r#"{"coin":"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn test_remove_missing_coin_is_not_found() {
    let (app, _) = app();

    let (status, body) =
        send(app, "DELETE", "/api/v1/currency/remove", r#"{"name_coin":"ethereum"}"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "NotFound");
}

#[tokio::test]
async fn test_add_then_remove() {
    let (app, _) = app();

    let (status, _) = send(app.clone(), "POST", "/api/v1/currency/add", r#"{"name_coin":"ethereum"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send(app, "DELETE", "/api/v1/currency/remove", r#"{"name_coin":"ETHEREUM"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn test_price_lookup_returns_nearest_snapshot() {
    let (app, store) = app();
    for (ts, price) in [(100, 1.5), (300, 3.5)] {
        store
            .append(&PriceSnapshot::from_price("bitcoin", ts, price, 8, "USD"))
            .await
            .unwrap();
    }

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/currency/price",
        &json!({"coin": "BITCOIN", "timestamp": 250}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"coin": "bitcoin", "price": 3.5, "currency": "USD", "timestamp": 300})
    );
}

#[tokio::test]
async fn test_price_lookup_without_snapshots_is_not_found() {
    let (app, _) = app();

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/currency/price",
        r#"{"coin":"doesnotexist","timestamp":100}"#,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "NotFound");
}

#[tokio::test]
async fn test_price_lookup_rejects_non_positive_timestamp() {
    let (app, _) = app();

    let (status, _) = send(
        app,
        "POST",
        "/api/v1/currency/price",
        r#"{"coin":"bitcoin","timestamp":0}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_healthz_ok() {
    let (app, _) = app();

    let (status, body) = send(app, "GET", "/healthz", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["healthy"], true);
}

#[tokio::test]
async fn test_healthz_reports_failing_component() {
    let store = Arc::new(MemoryStore::new());
    let pingers = vec![store.clone() as Arc<dyn Pinger>, Arc::new(DownPinger) as Arc<dyn Pinger>];
    let app = app_with(store, pingers);

    let (status, body) = send(app, "GET", "/healthz", "").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["data"]["components"][1]["name"], "price_feed");
    assert_eq!(body["data"]["components"][1]["healthy"], false);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = app();

    let (status, doc) = send(app, "GET", "/api-docs/openapi.json", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Coinwatch test API");
    assert_eq!(doc["info"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(doc["servers"][0]["url"], "http://tracker.test");
    for path in ["/api/v1/currency/add", "/api/v1/currency/remove", "/api/v1/currency/price"] {
        assert!(doc["paths"].get(path).is_some(), "missing {}", path);
    }
    assert!(doc["components"]["schemas"].get("PriceEnvelope").is_some());
}

#[tokio::test]
async fn test_swagger_ui_is_served() {
    let (app, _) = app();

    let request = Request::builder()
        .uri("/swagger/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
