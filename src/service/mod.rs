//! Service layer: business logic orchestration.
//!
//! [`WeightService`] serializes writes per animal, derives growth metrics,
//! keeps the animal summary in step and emits events through the
//! [`super::domain::EventBus`].

pub mod weight_service;

pub use weight_service::{MAX_PERIOD_DAYS, WeightService};
