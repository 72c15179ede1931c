//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`. Every resource endpoint
//! expects the caller's owner id in the `x-owner-id` header.

pub mod dto;
pub mod extract;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "weight-tracker", description = "Animal weight tracking API"),
    paths(
        handlers::animal::create_animal,
        handlers::animal::get_animal,
        handlers::observation::create_observation,
        handlers::observation::list_observations,
        handlers::observation::get_observation,
        handlers::observation::update_observation,
        handlers::observation::delete_observation,
        handlers::stats::weight_stats,
        handlers::stats::compare_weights,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::CreateAnimalRequest,
        dto::AnimalResponse,
        dto::CreateObservationRequest,
        dto::UpdateObservationRequest,
        dto::ObservationResponse,
        dto::ObservationListResponse,
        dto::PaginationMeta,
        dto::CompareRequest,
        dto::CompareResponse,
        crate::domain::WeightStats,
        crate::domain::ComparisonEntry,
        crate::domain::WeightPoint,
        crate::domain::WeightUnit,
        crate::error::ErrorResponse,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Animals", description = "Animal registration"),
        (name = "Weights", description = "Weight observations"),
        (name = "Statistics", description = "Windowed statistics and comparison"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
