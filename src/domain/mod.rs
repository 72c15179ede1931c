//! Domain layer: entities, derivation engine, window statistics and events.
//!
//! Everything in here is storage-agnostic. The derivation and statistics
//! modules are pure functions; the lock table and event bus are the only
//! stateful pieces.

pub mod animal;
pub mod animal_locks;
pub mod derivation;
pub mod event_bus;
pub mod ids;
pub mod observation;
pub mod stats;
pub mod weight_event;

pub use animal::{Animal, AnimalWeightSummary, NewAnimal};
pub use animal_locks::AnimalLocks;
pub use derivation::{GrowthMetrics, Reading, derive};
pub use event_bus::EventBus;
pub use ids::{AnimalId, ObservationId, OwnerId};
pub use observation::{ChronoKey, NewObservation, ObservationPatch, WeightObservation, WeightUnit};
pub use stats::{ComparisonEntry, DateRange, WeightPoint, WeightStats};
pub use weight_event::WeightEvent;
