//! Statistics and comparison DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AnimalId, ComparisonEntry};
use crate::error::TrackerError;

/// Query parameters for `GET /animals/{id}/weights/stats`.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsParams {
    /// Trailing window length in days. Defaults to the server setting.
    #[serde(default)]
    pub period: Option<u32>,
}

/// Request body for `POST /weights/compare`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompareRequest {
    /// Animals to compare, in the order they should be returned.
    #[serde(default)]
    #[schema(value_type = Vec<uuid::Uuid>)]
    pub animal_ids: serde_json::Value,
    /// Trailing window length in days. Defaults to the server setting.
    #[serde(default)]
    pub period: Option<u32>,
}

impl CompareRequest {
    /// Reads `animal_ids` as a list of animal identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] if `animal_ids` is not an array
    /// of UUID strings.
    pub fn ids(&self) -> Result<Vec<AnimalId>, TrackerError> {
        let serde_json::Value::Array(items) = &self.animal_ids else {
            return Err(TrackerError::InvalidInput(
                "animal_ids must be an array".to_string(),
            ));
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .and_then(|s| uuid::Uuid::parse_str(s).ok())
                    .map(AnimalId::from_uuid)
                    .ok_or_else(|| {
                        TrackerError::InvalidInput(format!("invalid animal id: {item}"))
                    })
            })
            .collect()
    }
}

/// Response body for `POST /weights/compare`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompareResponse {
    /// Window length used for every series.
    pub period_days: u32,
    /// One entry per requested animal, in request order.
    pub animals: Vec<ComparisonEntry>,
}
