//! HTTP surface
//!
//! - `GET    /healthz`
//! - `POST   /api/v1/currency/add`
//! - `DELETE /api/v1/currency/remove`
//! - `POST   /api/v1/currency/price`
//! - `GET    /swagger` and `/api-docs/openapi.json`

pub mod docs;
pub mod handlers;
pub mod response;

use crate::app::AppContext;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa_swagger_ui::SwaggerUi;

pub use docs::DocsInfo;

/// Everything the router needs beyond application state
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub cors_allow_origins: Vec<String>,
    pub request_timeout: Duration,
    pub docs: DocsInfo,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            cors_allow_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(60),
            docs: DocsInfo::default(),
        }
    }
}

pub fn router(ctx: AppContext, settings: &HttpSettings) -> Router {
    let api = Router::new()
        .route("/currency/add", post(handlers::add_coin))
        .route("/currency/remove", delete(handlers::remove_coin))
        .route("/currency/price", post(handlers::get_price));

    Router::new()
        .route("/healthz", get(handlers::health))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new(docs::SWAGGER_PATH).url(docs::OPENAPI_PATH, docs::openapi(&settings.docs)))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(cors_layer(&settings.cors_allow_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(parsed))
}
