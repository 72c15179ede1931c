//! Animal handlers: register and get.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AnimalResponse, CreateAnimalRequest};
use crate::api::extract::{ApiJson, Caller};
use crate::app_state::AppState;
use crate::domain::AnimalId;
use crate::error::{ErrorResponse, TrackerError};

/// `POST /animals` — Register an animal for the caller.
///
/// # Errors
///
/// Returns [`TrackerError::Validation`] on an invalid name.
#[utoipa::path(
    post,
    path = "/api/v1/animals",
    tag = "Animals",
    summary = "Register an animal",
    request_body = CreateAnimalRequest,
    params(("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id")),
    responses(
        (status = 201, description = "Animal registered", body = AnimalResponse),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 401, description = "Missing owner header", body = ErrorResponse),
    )
)]
pub async fn create_animal(
    State(state): State<AppState>,
    Caller(owner): Caller,
    ApiJson(req): ApiJson<CreateAnimalRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let animal = state
        .weight_service
        .register_animal(owner, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(AnimalResponse::from(animal))))
}

/// `GET /animals/{id}` — Animal details with its latest-weight summary.
///
/// # Errors
///
/// Returns [`TrackerError::AnimalNotFound`] if the animal is absent or
/// belongs to someone else.
#[utoipa::path(
    get,
    path = "/api/v1/animals/{id}",
    tag = "Animals",
    summary = "Get an animal",
    params(
        ("id" = uuid::Uuid, Path, description = "Animal UUID"),
        ("x-owner-id" = uuid::Uuid, Header, description = "Caller owner id"),
    ),
    responses(
        (status = 200, description = "Animal details", body = AnimalResponse),
        (status = 404, description = "Animal not found", body = ErrorResponse),
    )
)]
pub async fn get_animal(
    State(state): State<AppState>,
    Caller(owner): Caller,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    let animal = state
        .weight_service
        .get_animal(owner, AnimalId::from_uuid(id))
        .await?;
    Ok(Json(AnimalResponse::from(animal)))
}

/// Animal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/animals", post(create_animal))
        .route("/animals/{id}", get(get_animal))
}
