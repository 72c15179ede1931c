//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply with a numeric code.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope's `payload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific animals.
    Subscribe {
        /// Animal IDs to subscribe to. Use `["*"]` for all of the caller's animals.
        animal_ids: Vec<String>,
    },
    /// Unsubscribe from events for specific animals.
    Unsubscribe {
        /// Animal IDs to unsubscribe from.
        animal_ids: Vec<String>,
    },
    /// Fetch an animal's latest-weight summary.
    GetSummary {
        /// Target animal ID.
        animal_id: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscribe_command_parses_from_payload() {
        let payload = json!({ "command": "subscribe", "animal_ids": ["*"] });
        let Ok(cmd) = serde_json::from_value::<WsCommand>(payload) else {
            panic!("command rejected");
        };
        assert_eq!(
            cmd,
            WsCommand::Subscribe {
                animal_ids: vec!["*".to_string()]
            }
        );
    }

    #[test]
    fn envelope_uses_type_key() {
        let msg = WsMessage::error("req-1".to_string(), 400, "malformed JSON");
        let Ok(value) = serde_json::to_value(&msg) else {
            panic!("serialize failed");
        };
        assert_eq!(value["type"], "error");
        assert_eq!(value["payload"]["code"], 400);
    }
}
