//! In-memory store backing both store traits.
//!
//! Used when persistence is disabled and by the test suite. Each map sits
//! behind its own [`tokio::sync::RwLock`]; reads run concurrently.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AnimalStore, ObservationStore};
use crate::domain::observation::chronological;
use crate::domain::{
    Animal, AnimalId, AnimalWeightSummary, DateRange, ObservationId, ObservationPatch,
    WeightObservation,
};
use crate::error::TrackerError;

/// Process-local store for animals and weight observations.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    observations: RwLock<HashMap<ObservationId, WeightObservation>>,
    animals: RwLock<HashMap<AnimalId, Animal>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored observations.
    pub async fn observation_count(&self) -> usize {
        self.observations.read().await.len()
    }
}

#[async_trait]
impl ObservationStore for InMemoryStore {
    async fn find_by_animal(
        &self,
        animal_id: AnimalId,
        range: DateRange,
    ) -> Result<Vec<WeightObservation>, TrackerError> {
        let map = self.observations.read().await;
        let mut series: Vec<WeightObservation> = map
            .values()
            .filter(|o| o.animal_id == animal_id && range.contains(o.record_date))
            .cloned()
            .collect();
        series.sort_by(chronological);
        Ok(series)
    }

    async fn find_by_id(
        &self,
        id: ObservationId,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        Ok(self.observations.read().await.get(&id).cloned())
    }

    async fn find_latest(
        &self,
        animal_id: AnimalId,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        let map = self.observations.read().await;
        Ok(map
            .values()
            .filter(|o| o.animal_id == animal_id)
            .max_by_key(|o| o.chrono_key())
            .cloned())
    }

    async fn insert(&self, observation: &WeightObservation) -> Result<(), TrackerError> {
        let mut map = self.observations.write().await;
        if map.contains_key(&observation.id) {
            return Err(TrackerError::Storage(format!(
                "observation {} already exists",
                observation.id
            )));
        }
        map.insert(observation.id, observation.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: ObservationId,
        patch: &ObservationPatch,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        let mut map = self.observations.write().await;
        let Some(stored) = map.get_mut(&id) else {
            return Ok(None);
        };
        stored.apply(patch, Utc::now());
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: ObservationId) -> Result<bool, TrackerError> {
        Ok(self.observations.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl AnimalStore for InMemoryStore {
    async fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, TrackerError> {
        Ok(self.animals.read().await.get(&id).cloned())
    }

    async fn insert(&self, animal: &Animal) -> Result<(), TrackerError> {
        let mut map = self.animals.write().await;
        if map.contains_key(&animal.id) {
            return Err(TrackerError::Storage(format!(
                "animal {} already exists",
                animal.id
            )));
        }
        map.insert(animal.id, animal.clone());
        Ok(())
    }

    async fn update_summary(
        &self,
        id: AnimalId,
        summary: AnimalWeightSummary,
    ) -> Result<(), TrackerError> {
        let mut map = self.animals.write().await;
        let animal = map
            .get_mut(&id)
            .ok_or(TrackerError::AnimalNotFound(*id.as_uuid()))?;
        animal.summary = summary;
        Ok(())
    }
}
