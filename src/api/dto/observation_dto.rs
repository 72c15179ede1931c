//! Weight observation DTOs for create, edit, get and list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, parse_date};
use crate::domain::{
    AnimalId, DateRange, NewObservation, ObservationId, ObservationPatch, WeightObservation,
    WeightUnit,
};
use crate::error::TrackerError;

/// Request body for `POST /animals/{id}/weights`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateObservationRequest {
    /// Measured weight, `>= 0`.
    pub weight: f64,
    /// Unit (`kg` or `lb`), defaults to `kg`.
    #[serde(default)]
    pub unit: Option<WeightUnit>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; defaults to now.
    #[serde(default)]
    pub record_date: Option<String>,
    /// Who took the measurement.
    #[serde(default)]
    pub recorded_by: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<CreateObservationRequest> for NewObservation {
    type Error = TrackerError;

    fn try_from(req: CreateObservationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            weight: req.weight,
            unit: req.unit,
            record_date: req
                .record_date
                .as_deref()
                .map(|raw| parse_date("record_date", raw))
                .transpose()?,
            recorded_by: req.recorded_by,
            notes: req.notes,
        })
    }
}

/// Request body for `PATCH /weights/{id}`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateObservationRequest {
    /// New weight.
    #[serde(default)]
    pub weight: Option<f64>,
    /// New unit.
    #[serde(default)]
    pub unit: Option<WeightUnit>,
    /// New date, RFC 3339 or `YYYY-MM-DD`.
    #[serde(default)]
    pub record_date: Option<String>,
    /// New recorder.
    #[serde(default)]
    pub recorded_by: Option<String>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<UpdateObservationRequest> for ObservationPatch {
    type Error = TrackerError;

    fn try_from(req: UpdateObservationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            weight: req.weight,
            unit: req.unit,
            record_date: req
                .record_date
                .as_deref()
                .map(|raw| parse_date("record_date", raw))
                .transpose()?,
            recorded_by: req.recorded_by,
            notes: req.notes,
            metrics: None,
        })
    }
}

/// A stored observation with its derived growth metrics.
#[derive(Debug, Serialize, ToSchema)]
pub struct ObservationResponse {
    /// Observation identifier.
    pub observation_id: ObservationId,
    /// Animal the observation belongs to.
    pub animal_id: AnimalId,
    /// Measured weight.
    pub weight: f64,
    /// Unit of `weight`.
    pub unit: WeightUnit,
    /// When the weight was taken.
    pub record_date: DateTime<Utc>,
    /// Who took the measurement.
    pub recorded_by: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Difference to the previous observation.
    pub weight_change: f64,
    /// `weight_change` relative to the previous weight, in percent.
    pub change_percentage: f64,
    /// `weight_change` per day since the previous observation.
    pub growth_rate: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<WeightObservation> for ObservationResponse {
    fn from(obs: WeightObservation) -> Self {
        Self {
            observation_id: obs.id,
            animal_id: obs.animal_id,
            weight: obs.weight,
            unit: obs.unit,
            record_date: obs.record_date,
            recorded_by: obs.recorded_by,
            notes: obs.notes,
            weight_change: obs.weight_change,
            change_percentage: obs.change_percentage,
            growth_rate: obs.growth_rate,
            created_at: obs.created_at,
            updated_at: obs.updated_at,
        }
    }
}

/// Query parameters for `GET /animals/{id}/weights`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObservationListParams {
    /// Inclusive lower date bound (RFC 3339 or `YYYY-MM-DD`).
    #[serde(default)]
    pub from: Option<String>,
    /// Inclusive upper date bound (RFC 3339 or `YYYY-MM-DD`).
    #[serde(default)]
    pub to: Option<String>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl ObservationListParams {
    /// The date range selected by `from`/`to`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if a bound is not a valid date.
    pub fn range(&self) -> Result<DateRange, TrackerError> {
        Ok(DateRange {
            from: self.from.as_deref().map(|raw| parse_date("from", raw)).transpose()?,
            to: self.to.as_deref().map(|raw| parse_date("to", raw)).transpose()?,
        })
    }

    /// The requested page, with defaults filled in.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Paginated list response for `GET /animals/{id}/weights`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ObservationListResponse {
    /// Observations on this page, oldest first.
    pub data: Vec<ObservationResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
