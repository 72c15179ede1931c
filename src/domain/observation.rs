//! Weight observations: the stored record, creation input and edit patch.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::derivation::{GrowthMetrics, Reading};
use super::{AnimalId, ObservationId, OwnerId};
use crate::error::TrackerError;

/// Measurement unit recorded alongside a weight. No conversion is performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms.
    #[default]
    Kg,
    /// Pounds.
    Lb,
}

impl WeightUnit {
    /// Returns the lowercase wire/storage name of the unit.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lb => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kg" => Ok(Self::Kg),
            "lb" => Ok(Self::Lb),
            other => Err(TrackerError::Validation(format!("unknown weight unit: {other}"))),
        }
    }
}

/// Total chronological ordering key of an observation within its animal's
/// series: record date first, then creation time, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChronoKey {
    /// Date the weight was taken.
    pub record_date: DateTime<Utc>,
    /// Server creation timestamp, breaks ties between equal record dates.
    pub created_at: DateTime<Utc>,
    /// Final tie-breaker so the order is total.
    pub id: ObservationId,
}

/// A single dated weight measurement for one animal, with its derived
/// growth metrics relative to the chronologically preceding measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightObservation {
    /// Unique observation identifier.
    pub id: ObservationId,
    /// Owning animal (immutable after creation).
    pub animal_id: AnimalId,
    /// Owner the record is scoped to (immutable after creation).
    pub owner_id: OwnerId,
    /// Measured weight, finite and non-negative.
    pub weight: f64,
    /// Unit the weight was recorded in.
    pub unit: WeightUnit,
    /// When the weight was taken.
    pub record_date: DateTime<Utc>,
    /// Who took the measurement.
    pub recorded_by: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Difference from the preceding observation.
    pub weight_change: f64,
    /// `weight_change` as a percentage of the preceding weight.
    pub change_percentage: f64,
    /// `weight_change` per elapsed day.
    pub growth_rate: f64,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Server timestamp of the last edit.
    pub updated_at: DateTime<Utc>,
}

impl WeightObservation {
    /// Builds a fresh observation from validated creation input.
    ///
    /// Derived metrics start at zero; the service attaches them before the
    /// record is stored.
    #[must_use]
    pub fn new(
        animal_id: AnimalId,
        owner_id: OwnerId,
        input: NewObservation,
        now: DateTime<Utc>,
    ) -> Self {
        let now = storage_precision(now);
        Self {
            id: ObservationId::new(),
            animal_id,
            owner_id,
            weight: input.weight,
            unit: input.unit.unwrap_or_default(),
            record_date: input.record_date.map_or(now, storage_precision),
            recorded_by: input.recorded_by,
            notes: input.notes,
            weight_change: 0.0,
            change_percentage: 0.0,
            growth_rate: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the chronological ordering key of this observation.
    #[must_use]
    pub fn chrono_key(&self) -> ChronoKey {
        ChronoKey {
            record_date: self.record_date,
            created_at: self.created_at,
            id: self.id,
        }
    }

    /// Returns the weight/date pair fed to the derivation engine.
    #[must_use]
    pub fn reading(&self) -> Reading {
        Reading {
            weight: self.weight,
            record_date: self.record_date,
        }
    }

    /// Copies derived metrics onto the record.
    pub fn set_metrics(&mut self, metrics: GrowthMetrics) {
        self.weight_change = metrics.weight_change;
        self.change_percentage = metrics.change_percentage;
        self.growth_rate = metrics.growth_rate;
    }

    /// Applies every field present in `patch`, stamping `updated_at`.
    pub fn apply(&mut self, patch: &ObservationPatch, now: DateTime<Utc>) {
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(record_date) = patch.record_date {
            self.record_date = storage_precision(record_date);
        }
        if let Some(recorded_by) = &patch.recorded_by {
            self.recorded_by = Some(recorded_by.clone());
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(metrics) = patch.metrics {
            self.set_metrics(metrics);
        }
        self.updated_at = storage_precision(now);
    }
}

/// Truncates a timestamp to whole microseconds, the resolution PostgreSQL
/// keeps, so a returned record matches a later read of the same row.
fn storage_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Orders two observations chronologically by their [`ChronoKey`].
#[must_use]
pub fn chronological(a: &WeightObservation, b: &WeightObservation) -> Ordering {
    a.chrono_key().cmp(&b.chrono_key())
}

/// Input for recording a new observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewObservation {
    /// Measured weight.
    pub weight: f64,
    /// Unit, defaults to kilograms.
    pub unit: Option<WeightUnit>,
    /// When the weight was taken, defaults to now.
    pub record_date: Option<DateTime<Utc>>,
    /// Who took the measurement.
    pub recorded_by: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl NewObservation {
    /// Shorthand for an observation with only a weight and a date.
    #[must_use]
    pub fn at(weight: f64, record_date: DateTime<Utc>) -> Self {
        Self {
            weight,
            record_date: Some(record_date),
            ..Self::default()
        }
    }

    /// Checks the entity invariants on the input.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if the weight is negative or not
    /// a finite number.
    pub fn validate(&self) -> Result<(), TrackerError> {
        validate_weight(self.weight)
    }
}

/// Partial edit of an observation. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationPatch {
    /// New weight.
    pub weight: Option<f64>,
    /// New unit.
    pub unit: Option<WeightUnit>,
    /// New record date.
    pub record_date: Option<DateTime<Utc>>,
    /// New recorder.
    pub recorded_by: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// Re-derived metrics, set by the service when the weight or date moved.
    pub metrics: Option<GrowthMetrics>,
}

impl ObservationPatch {
    /// Checks the entity invariants on the fields being changed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if a new weight is negative or
    /// not a finite number.
    pub fn validate(&self) -> Result<(), TrackerError> {
        match self.weight {
            Some(weight) => validate_weight(weight),
            None => Ok(()),
        }
    }
}

fn validate_weight(weight: f64) -> Result<(), TrackerError> {
    if !weight.is_finite() {
        return Err(TrackerError::Validation(
            "weight must be a finite number".to_string(),
        ));
    }
    if weight < 0.0 {
        return Err(TrackerError::Validation(format!(
            "weight must be non-negative, got {weight}"
        )));
    }
    Ok(())
}
