//! # weight-tracker
//!
//! Animal weight time-series service. Stores weight observations per
//! animal, derives each observation's change against its chronological
//! predecessor, keeps a denormalized latest-weight summary on the animal and
//! answers windowed statistics and multi-animal comparisons.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── WeightService (service/)
//!     ├── EventBus, AnimalLocks (domain/)
//!     │
//!     ├── derive / stats (domain/)
//!     │
//!     └── ObservationStore + AnimalStore (persistence/)
//!           ├── InMemoryStore
//!           └── PostgresStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the full application: REST routes, `/ws`, tracing and CORS layers.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws::handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds application state over an in-memory store.
#[must_use]
pub fn in_memory_state(config: &config::TrackerConfig) -> AppState {
    let store = Arc::new(persistence::InMemoryStore::new());
    AppState::new(service_over(Arc::clone(&store) as _, store, config))
}

/// Wires a [`service::WeightService`] to the given stores using `config`.
#[must_use]
pub fn service_over(
    observations: Arc<dyn persistence::ObservationStore>,
    animals: Arc<dyn persistence::AnimalStore>,
    config: &config::TrackerConfig,
) -> service::WeightService {
    service::WeightService::new(
        observations,
        animals,
        domain::EventBus::new(config.event_bus_capacity),
    )
    .with_backdate_policy(config.backdate_policy)
    .with_compare_limit(config.max_compare_animals)
    .with_default_period(config.default_period_days)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn cors_header_and_json_rejection_body_on_router() {
        let app = build_app(in_memory_state(&config::TrackerConfig::default()));
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/api/v1/animals")
            .header("x-owner-id", uuid::Uuid::new_v4().to_string())
            .header(header::ORIGIN, "http://example.com")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"species":"dog"}"#))
        else {
            panic!("request build failed");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body is not JSON");
        };
        assert_eq!(body["error"]["kind"], "validation_error");
    }
}
