//! Weight observation handlers: record, list, get, edit, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreateObservationRequest, ObservationListParams, ObservationListResponse,
    ObservationResponse, UpdateObservationRequest,
};
use crate::api::extract::{ApiJson, ApiQuery, Caller};
use crate::app_state::AppState;
use crate::domain::{AnimalId, NewObservation, ObservationId, ObservationPatch};
use crate::error::{ErrorResponse, TrackerError};

/// `POST /animals/{id}/weights` — Record a weight observation.
///
/// # Errors
///
/// Returns [`TrackerError::Validation`] on a negative weight or malformed
/// date, or [`TrackerError::AnimalNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/animals/{id}/weights",
    tag = "Weights",
    summary = "Record a weight",
    description = "Stores an observation, derives its change against the previous observation and refreshes the animal's latest-weight summary.",
    request_body = CreateObservationRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Animal UUID"),
        ("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id"),
    ),
    responses(
        (status = 201, description = "Observation recorded", body = ObservationResponse),
        (status = 400, description = "Invalid weight or date", body = ErrorResponse),
        (status = 404, description = "Animal not found", body = ErrorResponse),
    )
)]
pub async fn create_observation(
    State(state): State<AppState>,
    Caller(owner): Caller,
    Path(id): Path<uuid::Uuid>,
    ApiJson(req): ApiJson<CreateObservationRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let input = NewObservation::try_from(req)?;
    let observation = state
        .weight_service
        .create_observation(owner, AnimalId::from_uuid(id), input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ObservationResponse::from(observation)),
    ))
}

/// `GET /animals/{id}/weights` — List an animal's observations, oldest first.
///
/// # Errors
///
/// Returns [`TrackerError::Validation`] on a malformed or inverted range, or
/// [`TrackerError::AnimalNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/animals/{id}/weights",
    tag = "Weights",
    summary = "List weights",
    params(
        ("id" = uuid::Uuid, Path, description = "Animal UUID"),
        ("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id"),
        ObservationListParams,
    ),
    responses(
        (status = 200, description = "Paginated observations", body = ObservationListResponse),
        (status = 404, description = "Animal not found", body = ErrorResponse),
    )
)]
pub async fn list_observations(
    State(state): State<AppState>,
    Caller(owner): Caller,
    Path(id): Path<uuid::Uuid>,
    ApiQuery(params): ApiQuery<ObservationListParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let range = params.range()?;
    let series = state
        .weight_service
        .list_observations(owner, AnimalId::from_uuid(id), range)
        .await?;

    let (page, pagination) = params.pagination().paginate(series);
    Ok(Json(ObservationListResponse {
        data: page.into_iter().map(ObservationResponse::from).collect(),
        pagination,
    }))
}

/// `GET /weights/{id}` — Get one observation.
///
/// # Errors
///
/// Returns [`TrackerError::ObservationNotFound`] if absent or foreign.
#[utoipa::path(
    get,
    path = "/api/v1/weights/{id}",
    tag = "Weights",
    summary = "Get a weight",
    params(
        ("id" = uuid::Uuid, Path, description = "Observation UUID"),
        ("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id"),
    ),
    responses(
        (status = 200, description = "Observation", body = ObservationResponse),
        (status = 404, description = "Observation not found", body = ErrorResponse),
    )
)]
pub async fn get_observation(
    State(state): State<AppState>,
    Caller(owner): Caller,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    let observation = state
        .weight_service
        .get_observation(owner, ObservationId::from_uuid(id))
        .await?;
    Ok(Json(ObservationResponse::from(observation)))
}

/// `PATCH /weights/{id}` — Edit an observation.
///
/// # Errors
///
/// Returns [`TrackerError::ObservationNotFound`] if absent or foreign, or
/// [`TrackerError::Validation`] on an invalid field.
#[utoipa::path(
    patch,
    path = "/api/v1/weights/{id}",
    tag = "Weights",
    summary = "Edit a weight",
    description = "Applies a partial edit. Changing the weight or date re-derives the observation against its predecessor.",
    request_body = UpdateObservationRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Observation UUID"),
        ("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id"),
    ),
    responses(
        (status = 200, description = "Updated observation", body = ObservationResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "Observation not found", body = ErrorResponse),
    )
)]
pub async fn update_observation(
    State(state): State<AppState>,
    Caller(owner): Caller,
    Path(id): Path<uuid::Uuid>,
    ApiJson(req): ApiJson<UpdateObservationRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let patch = ObservationPatch::try_from(req)?;
    let observation = state
        .weight_service
        .update_observation(owner, ObservationId::from_uuid(id), patch)
        .await?;
    Ok(Json(ObservationResponse::from(observation)))
}

/// `DELETE /weights/{id}` — Delete an observation.
///
/// # Errors
///
/// Returns [`TrackerError::ObservationNotFound`] if absent or foreign.
#[utoipa::path(
    delete,
    path = "/api/v1/weights/{id}",
    tag = "Weights",
    summary = "Delete a weight",
    params(
        ("id" = uuid::Uuid, Path, description = "Observation UUID"),
        ("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id"),
    ),
    responses(
        (status = 204, description = "Observation deleted"),
        (status = 404, description = "Observation not found", body = ErrorResponse),
    )
)]
pub async fn delete_observation(
    State(state): State<AppState>,
    Caller(owner): Caller,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    state
        .weight_service
        .delete_observation(owner, ObservationId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Observation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/animals/{id}/weights",
            get(list_observations).post(create_observation),
        )
        .route(
            "/weights/{id}",
            get(get_observation)
                .patch(update_observation)
                .delete(delete_observation),
        )
}
