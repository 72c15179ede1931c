//! Persistence layer: the store traits the service talks to, plus an
//! in-memory and a PostgreSQL implementation.
//!
//! The service only sees `Arc<dyn ObservationStore>` and
//! `Arc<dyn AnimalStore>`; which backend sits behind them is decided once in
//! `main.rs` from [`crate::config::TrackerConfig::persistence_enabled`].

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{
    Animal, AnimalId, AnimalWeightSummary, ChronoKey, DateRange, ObservationId, ObservationPatch,
    WeightObservation,
};
use crate::error::TrackerError;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Storage of weight observations.
///
/// Sequences are always returned ascending by [`ChronoKey`].
#[async_trait]
pub trait ObservationStore: Send + Sync + fmt::Debug {
    /// Returns the animal's observations whose record date lies in `range`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn find_by_animal(
        &self,
        animal_id: AnimalId,
        range: DateRange,
    ) -> Result<Vec<WeightObservation>, TrackerError>;

    /// Returns the observation with the given id, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn find_by_id(&self, id: ObservationId)
    -> Result<Option<WeightObservation>, TrackerError>;

    /// Returns the animal's chronologically latest observation, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn find_latest(
        &self,
        animal_id: AnimalId,
    ) -> Result<Option<WeightObservation>, TrackerError>;

    /// Returns the observation with the greatest key strictly below `key`,
    /// ignoring the observation whose id is `key.id`.
    ///
    /// The default scans the series up to `key.record_date`; backends with
    /// an ordered index should override it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn find_predecessor(
        &self,
        animal_id: AnimalId,
        key: ChronoKey,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        let range = DateRange {
            from: None,
            to: Some(key.record_date),
        };
        let series = self.find_by_animal(animal_id, range).await?;
        Ok(series
            .into_iter()
            .filter(|o| o.id != key.id && o.chrono_key() < key)
            .max_by_key(WeightObservation::chrono_key))
    }

    /// Stores a new observation.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn insert(&self, observation: &WeightObservation) -> Result<(), TrackerError>;

    /// Applies `patch` and returns the stored result, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn update(
        &self,
        id: ObservationId,
        patch: &ObservationPatch,
    ) -> Result<Option<WeightObservation>, TrackerError>;

    /// Deletes an observation. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn delete(&self, id: ObservationId) -> Result<bool, TrackerError>;
}

/// Storage of animals and their latest-weight summary.
#[async_trait]
pub trait AnimalStore: Send + Sync + fmt::Debug {
    /// Returns the animal with the given id, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, TrackerError>;

    /// Stores a newly registered animal.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the backend fails.
    async fn insert(&self, animal: &Animal) -> Result<(), TrackerError>;

    /// Overwrites the animal's summary.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AnimalNotFound`] if the animal does not exist,
    /// or [`TrackerError::Storage`] if the backend fails.
    async fn update_summary(
        &self,
        id: AnimalId,
        summary: AnimalWeightSummary,
    ) -> Result<(), TrackerError>;
}
