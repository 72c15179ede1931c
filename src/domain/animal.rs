//! Animal records and their cached latest-weight summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::observation::WeightObservation;
use super::{AnimalId, OwnerId};
use crate::error::TrackerError;

/// Cached view of an animal's chronologically latest observation.
///
/// Recomputed from the observation set after every mutation; never reset
/// when the last observation is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnimalWeightSummary {
    /// Weight of the latest observation.
    pub current_weight: Option<f64>,
    /// Record date of the latest observation.
    pub last_weight_date: Option<DateTime<Utc>>,
}

impl AnimalWeightSummary {
    /// Summary pointing at `observation`.
    #[must_use]
    pub fn from_observation(observation: &WeightObservation) -> Self {
        Self {
            current_weight: Some(observation.weight),
            last_weight_date: Some(observation.record_date),
        }
    }
}

/// An animal owned by a single owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    /// Unique animal identifier.
    pub id: AnimalId,
    /// Owner the animal belongs to.
    pub owner_id: OwnerId,
    /// Display name.
    pub name: String,
    /// Optional species or breed label.
    pub species: Option<String>,
    /// Latest-weight summary.
    pub summary: AnimalWeightSummary,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl Animal {
    /// Registers a new animal with an empty summary.
    #[must_use]
    pub fn new(owner_id: OwnerId, input: NewAnimal, now: DateTime<Utc>) -> Self {
        Self {
            id: AnimalId::new(),
            owner_id,
            name: input.name.trim().to_string(),
            species: input.species,
            summary: AnimalWeightSummary::default(),
            created_at: now,
        }
    }

    /// Returns `true` if `owner` owns this animal.
    #[must_use]
    pub fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.owner_id == owner
    }
}

/// Input for registering an animal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAnimal {
    /// Display name, 1–100 characters after trimming.
    pub name: String,
    /// Optional species or breed label.
    pub species: Option<String>,
}

impl NewAnimal {
    /// Checks that the name is present and of reasonable length.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] on an empty or over-long name.
    pub fn validate(&self) -> Result<(), TrackerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TrackerError::Validation("animal name is required".to_string()));
        }
        if name.chars().count() > 100 {
            return Err(TrackerError::Validation(
                "animal name must be at most 100 characters".to_string(),
            ));
        }
        Ok(())
    }
}
