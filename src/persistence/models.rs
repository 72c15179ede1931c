//! Database row models for animals and weight records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Animal, AnimalId, AnimalWeightSummary, ObservationId, OwnerId, WeightObservation,
};
use crate::error::TrackerError;

/// A row of the `weight_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeightRecordRow {
    /// Observation id.
    pub id: Uuid,
    /// Owning animal.
    pub animal_id: Uuid,
    /// Owner.
    pub owner_id: Uuid,
    /// Measured weight.
    pub weight: f64,
    /// Unit name (`kg` / `lb`).
    pub unit: String,
    /// Record date.
    pub record_date: DateTime<Utc>,
    /// Recorder.
    pub recorded_by: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Derived weight change.
    pub weight_change: f64,
    /// Derived change percentage.
    pub change_percentage: f64,
    /// Derived growth rate.
    pub growth_rate: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WeightRecordRow> for WeightObservation {
    type Error = TrackerError;

    fn try_from(row: WeightRecordRow) -> Result<Self, Self::Error> {
        let unit = row
            .unit
            .parse()
            .map_err(|_| TrackerError::Storage(format!("corrupt unit in row {}", row.id)))?;
        Ok(Self {
            id: ObservationId::from_uuid(row.id),
            animal_id: AnimalId::from_uuid(row.animal_id),
            owner_id: OwnerId::from_uuid(row.owner_id),
            weight: row.weight,
            unit,
            record_date: row.record_date,
            recorded_by: row.recorded_by,
            notes: row.notes,
            weight_change: row.weight_change,
            change_percentage: row.change_percentage,
            growth_rate: row.growth_rate,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row of the `animals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnimalRow {
    /// Animal id.
    pub id: Uuid,
    /// Owner.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Species label.
    pub species: Option<String>,
    /// Cached current weight.
    pub current_weight: Option<f64>,
    /// Cached last weight date.
    pub last_weight_date: Option<DateTime<Utc>>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<AnimalRow> for Animal {
    fn from(row: AnimalRow) -> Self {
        Self {
            id: AnimalId::from_uuid(row.id),
            owner_id: OwnerId::from_uuid(row.owner_id),
            name: row.name,
            species: row.species,
            summary: AnimalWeightSummary {
                current_weight: row.current_weight,
                last_weight_date: row.last_weight_date,
            },
            created_at: row.created_at,
        }
    }
}
