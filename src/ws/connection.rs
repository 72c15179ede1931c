//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{AnimalId, OwnerId, WeightEvent};
use crate::error::TrackerError;
use crate::service::WeightService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events of `owner`'s animals from the
///   [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    owner: OwnerId,
    mut event_rx: broadcast::Receiver<WeightEvent>,
    weight_service: Arc<WeightService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();
    tracing::debug!(%owner, "ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, owner, &mut subs, &weight_service).await;
                        if let Some(json) = reply
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(weight_event) => {
                        if !should_forward(&weight_event, owner, &mut subs, &weight_service).await {
                            continue;
                        }
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            serde_json::to_value(&weight_event).unwrap_or_default(),
                        );
                        let json = serde_json::to_string(&msg).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(%owner, "ws connection closed");
}

async fn should_forward(
    event: &WeightEvent,
    owner: OwnerId,
    subs: &mut SubscriptionManager,
    weight_service: &WeightService,
) -> bool {
    let animal_id = event.animal_id();
    if !subs.wants(animal_id) {
        return false;
    }
    if let Some(owned) = subs.ownership(animal_id) {
        return owned;
    }
    let owned = weight_service.get_animal(owner, animal_id).await.is_ok();
    subs.remember_ownership(animal_id, owned);
    owned
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    owner: OwnerId,
    subs: &mut SubscriptionManager,
    weight_service: &WeightService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON"))
            .ok();
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let reply = match command {
        WsCommand::Subscribe { animal_ids } => {
            let (ids, wildcard) = parse_ids(&animal_ids);
            let mut accepted = Vec::with_capacity(ids.len());
            let mut rejected = Vec::new();
            for id in ids {
                if weight_service.get_animal(owner, id).await.is_ok() {
                    accepted.push(id);
                } else {
                    rejected.push(id);
                }
            }
            subs.subscribe(&accepted, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": accepted.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "rejected": rejected.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { animal_ids } => {
            let (ids, _) = parse_ids(&animal_ids);
            subs.unsubscribe(&ids);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                }),
            )
        }
        WsCommand::GetSummary { animal_id } => {
            let Ok(uuid) = animal_id.parse::<uuid::Uuid>() else {
                return serde_json::to_string(&WsMessage::error(msg.id, 400, "invalid animal_id"))
                    .ok();
            };
            match weight_service
                .get_animal(owner, AnimalId::from_uuid(uuid))
                .await
            {
                Ok(animal) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "animal_id": animal.id,
                        "current_weight": animal.summary.current_weight,
                        "last_weight_date": animal.summary.last_weight_date,
                    }),
                ),
                Err(e) => error_reply(msg.id, &e),
            }
        }
    };
    serde_json::to_string(&reply).ok()
}

fn error_reply(id: String, error: &TrackerError) -> WsMessage {
    WsMessage::error(id, error.status_code().as_u16(), &error.to_string())
}

/// Splits raw ids into parsed animal ids and the wildcard flag. Unparseable
/// entries are dropped.
fn parse_ids(raw: &[String]) -> (Vec<AnimalId>, bool) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    for s in raw {
        if s == "*" {
            wildcard = true;
        } else if let Ok(uuid) = s.parse::<uuid::Uuid>() {
            ids.push(AnimalId::from_uuid(uuid));
        }
    }
    (ids, wildcard)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_ids_handles_wildcard_and_garbage() {
        let id = AnimalId::new();
        let raw = vec!["*".to_string(), id.to_string(), "not-a-uuid".to_string()];
        let (ids, wildcard) = parse_ids(&raw);
        assert!(wildcard);
        assert_eq!(ids, vec![id]);
    }
}
