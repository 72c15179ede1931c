//! Animal DTOs for registration and lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Animal, AnimalId, NewAnimal};

/// Request body for `POST /animals`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAnimalRequest {
    /// Display name (1–100 chars).
    pub name: String,
    /// Optional species or breed label.
    #[serde(default)]
    pub species: Option<String>,
}

impl From<CreateAnimalRequest> for NewAnimal {
    fn from(req: CreateAnimalRequest) -> Self {
        Self {
            name: req.name,
            species: req.species,
        }
    }
}

/// An animal with its latest-weight summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnimalResponse {
    /// Animal identifier.
    pub animal_id: AnimalId,
    /// Display name.
    pub name: String,
    /// Species label.
    pub species: Option<String>,
    /// Weight of the latest observation, if any was ever recorded.
    pub current_weight: Option<f64>,
    /// Date of the latest observation.
    pub last_weight_date: Option<DateTime<Utc>>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Animal> for AnimalResponse {
    fn from(animal: Animal) -> Self {
        Self {
            animal_id: animal.id,
            name: animal.name,
            species: animal.species,
            current_weight: animal.summary.current_weight,
            last_weight_date: animal.summary.last_weight_date,
            created_at: animal.created_at,
        }
    }
}
