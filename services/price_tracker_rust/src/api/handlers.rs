use super::response::{
    ApiError, ApiResponse, ApiStatus, CoinEnvelope, HealthEnvelope, PriceEnvelope, STATUS_ERROR,
    STATUS_OK,
};
use crate::app::AppContext;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coinwatch_core::PriceQuery;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CoinRequest {
    #[schema(example = "bitcoin")]
    pub name_coin: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoinData {
    /// Normalized listing id
    pub name_coin: String,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Every component answered", body = HealthEnvelope),
        (status = 503, description = "At least one component failed", body = HealthEnvelope)
    )
)]
pub async fn health(State(ctx): State<AppContext>) -> Response {
    let report = ctx.health.check().await;

    let (status, label, message) = if report.healthy {
        (StatusCode::OK, STATUS_OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, STATUS_ERROR, "unhealthy")
    };

    let body: HealthEnvelope = ApiResponse {
        status: label,
        message: message.to_string(),
        data: Some(report),
    };
    (status, Json(body)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/v1/currency/add",
    tag = "currency",
    request_body = CoinRequest,
    responses(
        (status = 200, description = "Coin is on the watch list", body = CoinEnvelope),
        (status = 400, description = "Malformed body, empty or unknown coin", body = ApiStatus),
        (status = 500, description = "Storage unavailable", body = ApiStatus)
    )
)]
pub async fn add_coin(
    State(ctx): State<AppContext>,
    payload: Result<Json<CoinRequest>, JsonRejection>,
) -> ApiResult<CoinEnvelope> {
    let Json(request) = payload?;
    let name_coin = ctx.watch_list.add(&request.name_coin).await?;

    Ok(ApiResponse::ok("coin added to watch list", Some(CoinData { name_coin })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/currency/remove",
    tag = "currency",
    request_body = CoinRequest,
    responses(
        (status = 200, description = "Coin removed", body = ApiStatus),
        (status = 400, description = "Malformed body or empty coin", body = ApiStatus),
        (status = 404, description = "Coin was not being watched", body = ApiStatus),
        (status = 500, description = "Storage unavailable", body = ApiStatus)
    )
)]
pub async fn remove_coin(
    State(ctx): State<AppContext>,
    payload: Result<Json<CoinRequest>, JsonRejection>,
) -> ApiResult<ApiStatus> {
    let Json(request) = payload?;
    ctx.watch_list.remove(&request.name_coin).await?;

    Ok(ApiStatus::ok("coin removed from watch list"))
}

#[utoipa::path(
    post,
    path = "/api/v1/currency/price",
    tag = "currency",
    request_body = PriceQuery,
    responses(
        (status = 200, description = "Snapshot nearest to the timestamp", body = PriceEnvelope),
        (status = 400, description = "Malformed body, empty coin or timestamp <= 0", body = ApiStatus),
        (status = 404, description = "No snapshot for the coin", body = ApiStatus),
        (status = 500, description = "Storage unavailable", body = ApiStatus)
    )
)]
pub async fn get_price(
    State(ctx): State<AppContext>,
    payload: Result<Json<PriceQuery>, JsonRejection>,
) -> ApiResult<PriceEnvelope> {
    let Json(query) = payload?;
    let result = ctx.resolver.resolve(&query).await?;

    Ok(ApiResponse::ok("price found", Some(result)))
}
