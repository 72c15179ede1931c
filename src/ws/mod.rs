//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams weight events for the animals a
//! client subscribes to and answers summary lookups.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
