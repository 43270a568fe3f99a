//! JSON envelope shared by every endpoint and the error-to-status mapping.

use super::handlers::CoinData;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coinwatch_core::db::HealthReport;
use coinwatch_core::{ErrorKind, PriceResult, TrackerError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

pub const STATUS_OK: &str = "OK";
pub const STATUS_NOT_FOUND: &str = "NotFound";
pub const STATUS_ERROR: &str = "ERROR";

#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    CoinEnvelope = ApiResponse<CoinData>,
    PriceEnvelope = ApiResponse<PriceResult>,
    HealthEnvelope = ApiResponse<HealthReport>
)]
pub struct ApiResponse<T> {
    #[schema(value_type = String, example = "OK")]
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Envelope without a payload: errors and removals
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiStatus {
    #[schema(value_type = String, example = "NotFound")]
    pub status: &'static str,
    pub message: String,
}

impl ApiStatus {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: STATUS_OK,
            message: message.into(),
        })
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Json<Self> {
        Json(Self {
            status: STATUS_OK,
            message: message.into(),
            data,
        })
    }
}

/// Failure surfaced to an HTTP caller
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Tracker(TrackerError),
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        Self::Tracker(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, STATUS_ERROR, msg.clone()),
            Self::Tracker(e) => match e.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, STATUS_ERROR, e.to_string()),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, STATUS_NOT_FOUND, e.to_string()),
                ErrorKind::Transient => {
                    error!("Request failed: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        STATUS_ERROR,
                        "internal error, try again later".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, message) = self.parts();
        (status, Json(ApiStatus { status: label, message })).into_response()
    }
}
