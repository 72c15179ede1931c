//! Windowed statistics and multi-animal comparison handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CompareRequest, CompareResponse, StatsParams};
use crate::api::extract::{ApiJson, ApiQuery, Caller};
use crate::app_state::AppState;
use crate::domain::{AnimalId, WeightStats};
use crate::error::{ErrorResponse, TrackerError};

/// `GET /animals/{id}/weights/stats` — Statistics over a trailing window.
///
/// # Errors
///
/// Returns [`TrackerError::Validation`] on an out-of-range period, or
/// [`TrackerError::AnimalNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/animals/{id}/weights/stats",
    tag = "Statistics",
    summary = "Weight statistics",
    description = "Highest and lowest weight, total gain and average daily growth over the last `period` days.",
    params(
        ("id" = uuid::Uuid, Path, description = "Animal UUID"),
        ("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id"),
        StatsParams,
    ),
    responses(
        (status = 200, description = "Window statistics", body = WeightStats),
        (status = 400, description = "Invalid period", body = ErrorResponse),
        (status = 404, description = "Animal not found", body = ErrorResponse),
    )
)]
pub async fn weight_stats(
    State(state): State<AppState>,
    Caller(owner): Caller,
    Path(id): Path<uuid::Uuid>,
    ApiQuery(params): ApiQuery<StatsParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let service = &state.weight_service;
    let period = params.period.unwrap_or_else(|| service.default_period_days());
    let stats = service
        .weight_stats(owner, AnimalId::from_uuid(id), period)
        .await?;
    Ok(Json(stats))
}

/// `POST /weights/compare` — Side-by-side series for several animals.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidInput`] on a malformed, empty or oversized
/// id list, or when any animal is missing or foreign.
#[utoipa::path(
    post,
    path = "/api/v1/weights/compare",
    tag = "Statistics",
    summary = "Compare animals",
    request_body = CompareRequest,
    params(("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id")),
    responses(
        (status = 200, description = "Comparison series", body = CompareResponse),
        (status = 400, description = "Invalid animal list or period", body = ErrorResponse),
    )
)]
pub async fn compare_weights(
    State(state): State<AppState>,
    Caller(owner): Caller,
    ApiJson(req): ApiJson<CompareRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let ids = req.ids()?;
    let service = &state.weight_service;
    let period_days = req.period.unwrap_or_else(|| service.default_period_days());
    let animals = service.compare_weights(owner, &ids, period_days).await?;
    Ok(Json(CompareResponse {
        period_days,
        animals,
    }))
}

/// Statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/animals/{id}/weights/stats", get(weight_stats))
        .route("/weights/compare", post(compare_weights))
}
