//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::api::extract::Caller;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// The upgrade request must carry the `x-owner-id` header; the connection
/// only ever sees events of that owner's animals.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Caller(owner): Caller,
) -> impl IntoResponse {
    let event_rx = state.event_bus.subscribe();
    let weight_service = std::sync::Arc::clone(&state.weight_service);

    ws.on_upgrade(move |socket| run_connection(socket, owner, event_rx, weight_service))
}
