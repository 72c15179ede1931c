//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::WeightService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Weight service for all business logic.
    pub weight_service: Arc<WeightService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps a service, sharing its event bus with the WebSocket layer.
    #[must_use]
    pub fn new(weight_service: WeightService) -> Self {
        let event_bus = weight_service.event_bus().clone();
        Self {
            weight_service: Arc::new(weight_service),
            event_bus,
        }
    }
}
