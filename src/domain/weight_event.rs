//! Domain events reflecting weight series mutations.
//!
//! Every mutation emits a [`WeightEvent`] through the [`super::EventBus`];
//! WebSocket subscribers receive the events for the animals they follow.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AnimalId, ObservationId};

/// Domain event emitted after every series mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum WeightEvent {
    /// A new observation was stored.
    ObservationRecorded {
        /// Owning animal.
        animal_id: AnimalId,
        /// New observation.
        observation_id: ObservationId,
        /// Recorded weight.
        weight: f64,
        /// Derived change from the predecessor.
        weight_change: f64,
        /// Date the weight was taken.
        record_date: DateTime<Utc>,
        /// Emission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An existing observation was edited.
    ObservationUpdated {
        /// Owning animal.
        animal_id: AnimalId,
        /// Edited observation.
        observation_id: ObservationId,
        /// Weight after the edit.
        weight: f64,
        /// Whether derived metrics were recomputed.
        rederived: bool,
        /// Emission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An observation was deleted.
    ObservationDeleted {
        /// Owning animal.
        animal_id: AnimalId,
        /// Deleted observation.
        observation_id: ObservationId,
        /// Emission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The animal's latest-weight summary was rewritten.
    SummaryUpdated {
        /// Animal whose summary changed.
        animal_id: AnimalId,
        /// New current weight.
        current_weight: f64,
        /// Record date backing the new current weight.
        last_weight_date: DateTime<Utc>,
        /// Emission timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl WeightEvent {
    /// Returns the animal this event concerns.
    #[must_use]
    pub fn animal_id(&self) -> AnimalId {
        match self {
            Self::ObservationRecorded { animal_id, .. }
            | Self::ObservationUpdated { animal_id, .. }
            | Self::ObservationDeleted { animal_id, .. }
            | Self::SummaryUpdated { animal_id, .. } => *animal_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ObservationRecorded { .. } => "observation_recorded",
            Self::ObservationUpdated { .. } => "observation_updated",
            Self::ObservationDeleted { .. } => "observation_deleted",
            Self::SummaryUpdated { .. } => "summary_updated",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn deleted_event_type() {
        let event = WeightEvent::ObservationDeleted {
            animal_id: AnimalId::new(),
            observation_id: ObservationId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "observation_deleted");
    }

    #[test]
    fn summary_updated_serializes_with_tag() {
        let event = WeightEvent::SummaryUpdated {
            animal_id: AnimalId::new(),
            current_weight: 412.5,
            last_weight_date: Utc::now(),
            timestamp: Utc::now(),
        };
        let Ok(json) = serde_json::to_string(&event) else {
            panic!("serialization failed");
        };
        assert!(json.contains("\"event_type\":\"summary_updated\""));
        assert!(json.contains("412.5"));
    }

    #[test]
    fn animal_id_accessor() {
        let id = AnimalId::new();
        let event = WeightEvent::ObservationUpdated {
            animal_id: id,
            observation_id: ObservationId::new(),
            weight: 10.0,
            rederived: true,
            timestamp: Utc::now(),
        };
        assert_eq!(event.animal_id(), id);
    }
}
