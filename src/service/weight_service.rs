//! Weight service: keeps an animal's observations, their derived metrics and
//! the animal's latest-weight summary consistent, and answers window queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::BackdatePolicy;
use crate::domain::stats::{comparison_entry, summarize};
use crate::domain::{
    Animal, AnimalId, AnimalLocks, AnimalWeightSummary, ComparisonEntry, DateRange, EventBus,
    NewAnimal, NewObservation, ObservationId, ObservationPatch, OwnerId, WeightEvent,
    WeightObservation, WeightStats, derive,
};
use crate::error::TrackerError;
use crate::persistence::{AnimalStore, ObservationStore};

/// Longest statistics window accepted, in days.
pub const MAX_PERIOD_DAYS: u32 = 3650;

/// Orchestration layer for every weight series operation.
///
/// Every mutation follows the pattern: take the animal's write lock → read
/// the neighbors it needs → derive → write the observation → recompute and
/// write the summary → emit events. The observation and summary writes are
/// not atomic; a failure between them leaves the summary stale until the
/// next mutation of the same animal recomputes it.
#[derive(Debug, Clone)]
pub struct WeightService {
    observations: Arc<dyn ObservationStore>,
    animals: Arc<dyn AnimalStore>,
    locks: Arc<AnimalLocks>,
    event_bus: EventBus,
    backdate_policy: BackdatePolicy,
    max_compare_animals: usize,
    default_period_days: u32,
}

impl WeightService {
    /// Creates a service over the given stores with default settings.
    #[must_use]
    pub fn new(
        observations: Arc<dyn ObservationStore>,
        animals: Arc<dyn AnimalStore>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            observations,
            animals,
            locks: Arc::new(AnimalLocks::new()),
            event_bus,
            backdate_policy: BackdatePolicy::default(),
            max_compare_animals: 10,
            default_period_days: 30,
        }
    }

    /// Sets how back-dated creations are derived and summarized.
    #[must_use]
    pub fn with_backdate_policy(mut self, policy: BackdatePolicy) -> Self {
        self.backdate_policy = policy;
        self
    }

    /// Sets the maximum number of animals in one comparison.
    #[must_use]
    pub fn with_compare_limit(mut self, limit: usize) -> Self {
        self.max_compare_animals = limit.max(1);
        self
    }

    /// Sets the statistics window used when a caller names none.
    #[must_use]
    pub fn with_default_period(mut self, days: u32) -> Self {
        self.default_period_days = days.clamp(1, MAX_PERIOD_DAYS);
        self
    }

    /// The configured back-date policy.
    #[must_use]
    pub fn backdate_policy(&self) -> BackdatePolicy {
        self.backdate_policy
    }

    /// Statistics window used when a caller names none.
    #[must_use]
    pub fn default_period_days(&self) -> u32 {
        self.default_period_days
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Releases lock entries of animals nobody is mutating.
    pub async fn prune_locks(&self) {
        self.locks.prune().await;
    }

    // ── Animals ─────────────────────────────────────────────────────────

    /// Registers a new animal for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] on an invalid name, or a store
    /// error.
    pub async fn register_animal(
        &self,
        owner: OwnerId,
        input: NewAnimal,
    ) -> Result<Animal, TrackerError> {
        input.validate()?;
        let animal = Animal::new(owner, input, Utc::now());
        self.animals.insert(&animal).await?;
        tracing::info!(animal_id = %animal.id, %owner, "animal registered");
        Ok(animal)
    }

    /// Returns the animal if it exists and belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AnimalNotFound`] if the animal is absent or
    /// owned by someone else.
    pub async fn get_animal(&self, owner: OwnerId, id: AnimalId) -> Result<Animal, TrackerError> {
        self.animals
            .find_by_id(id)
            .await?
            .filter(|a| a.is_owned_by(owner))
            .ok_or(TrackerError::AnimalNotFound(*id.as_uuid()))
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Records a new observation, derives its metrics and refreshes the
    /// animal summary according to the configured [`BackdatePolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] on an invalid weight,
    /// [`TrackerError::AnimalNotFound`] if the animal is absent or foreign,
    /// or a store error.
    pub async fn create_observation(
        &self,
        owner: OwnerId,
        animal_id: AnimalId,
        input: NewObservation,
    ) -> Result<WeightObservation, TrackerError> {
        input.validate()?;
        let _guard = self.locks.acquire(animal_id).await;
        self.get_animal(owner, animal_id).await?;

        let mut observation = WeightObservation::new(animal_id, owner, input, Utc::now());
        let previous = match self.backdate_policy {
            BackdatePolicy::Latest => self.observations.find_latest(animal_id).await?,
            BackdatePolicy::Chronological => {
                self.observations
                    .find_predecessor(animal_id, observation.chrono_key())
                    .await?
            }
        };
        let metrics = derive(
            observation.reading(),
            previous.as_ref().map(WeightObservation::reading),
        );
        observation.set_metrics(metrics);

        self.observations.insert(&observation).await?;
        tracing::info!(
            %animal_id,
            observation_id = %observation.id,
            weight = observation.weight,
            weight_change = observation.weight_change,
            "observation recorded"
        );

        let _ = self.event_bus.publish(WeightEvent::ObservationRecorded {
            animal_id,
            observation_id: observation.id,
            weight: observation.weight,
            weight_change: observation.weight_change,
            record_date: observation.record_date,
            timestamp: Utc::now(),
        });

        let becomes_summary = match self.backdate_policy {
            BackdatePolicy::Latest => true,
            BackdatePolicy::Chronological => self
                .observations
                .find_latest(animal_id)
                .await?
                .is_some_and(|latest| latest.id == observation.id),
        };
        if becomes_summary {
            self.write_summary(animal_id, &observation).await?;
        } else {
            tracing::debug!(
                %animal_id,
                observation_id = %observation.id,
                "back-dated observation left summary untouched"
            );
        }

        Ok(observation)
    }

    /// Edits an observation. Metrics are re-derived against the record's true
    /// predecessor when its weight or date changes.
    ///
    /// The summary is written only if the edited record is the animal's
    /// latest afterwards. If a date edit makes a *different* record the
    /// latest, the summary is left as is until the next mutation.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ObservationNotFound`] if the observation is
    /// absent or foreign, [`TrackerError::Validation`] on an invalid weight,
    /// or a store error.
    pub async fn update_observation(
        &self,
        owner: OwnerId,
        id: ObservationId,
        mut patch: ObservationPatch,
    ) -> Result<WeightObservation, TrackerError> {
        let animal_id = self.get_observation(owner, id).await?.animal_id;
        patch.validate()?;
        let _guard = self.locks.acquire(animal_id).await;
        // Re-read under the lock; the record may have moved since.
        let existing = self.get_observation(owner, id).await?;

        let weight_changed = patch.weight.is_some_and(|w| w != existing.weight);
        let date_changed = patch.record_date.is_some_and(|d| d != existing.record_date);
        let rederived = weight_changed || date_changed;

        if rederived {
            let mut moved = existing.clone();
            moved.weight = patch.weight.unwrap_or(existing.weight);
            moved.record_date = patch.record_date.unwrap_or(existing.record_date);
            let previous = self
                .observations
                .find_predecessor(animal_id, moved.chrono_key())
                .await?;
            patch.metrics = Some(derive(
                moved.reading(),
                previous.as_ref().map(WeightObservation::reading),
            ));
        }

        let updated = self
            .observations
            .update(id, &patch)
            .await?
            .ok_or(TrackerError::ObservationNotFound(*id.as_uuid()))?;
        tracing::info!(
            %animal_id,
            observation_id = %id,
            rederived,
            "observation updated"
        );

        let _ = self.event_bus.publish(WeightEvent::ObservationUpdated {
            animal_id,
            observation_id: id,
            weight: updated.weight,
            rederived,
            timestamp: Utc::now(),
        });

        match self.observations.find_latest(animal_id).await? {
            Some(latest) if latest.id == updated.id => {
                self.write_summary(animal_id, &updated).await?;
            }
            Some(latest) => {
                tracing::warn!(
                    %animal_id,
                    observation_id = %id,
                    latest_id = %latest.id,
                    "updated observation is not the latest; summary left untouched"
                );
            }
            None => {}
        }

        Ok(updated)
    }

    /// Deletes an observation and recomputes the summary from what remains.
    /// Deleting the last observation leaves the summary at its last value.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ObservationNotFound`] if the observation is
    /// absent or foreign, or a store error.
    pub async fn delete_observation(
        &self,
        owner: OwnerId,
        id: ObservationId,
    ) -> Result<(), TrackerError> {
        let animal_id = self.get_observation(owner, id).await?.animal_id;
        let _guard = self.locks.acquire(animal_id).await;
        self.get_observation(owner, id).await?;

        if !self.observations.delete(id).await? {
            return Err(TrackerError::ObservationNotFound(*id.as_uuid()));
        }
        tracing::info!(%animal_id, observation_id = %id, "observation deleted");

        let _ = self.event_bus.publish(WeightEvent::ObservationDeleted {
            animal_id,
            observation_id: id,
            timestamp: Utc::now(),
        });

        if let Some(latest) = self.observations.find_latest(animal_id).await? {
            self.write_summary(animal_id, &latest).await?;
        } else {
            tracing::debug!(%animal_id, "no observations left; summary kept");
        }
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// Returns the observation if it exists and belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ObservationNotFound`] if the observation is
    /// absent or foreign.
    pub async fn get_observation(
        &self,
        owner: OwnerId,
        id: ObservationId,
    ) -> Result<WeightObservation, TrackerError> {
        self.observations
            .find_by_id(id)
            .await?
            .filter(|o| o.owner_id == owner)
            .ok_or(TrackerError::ObservationNotFound(*id.as_uuid()))
    }

    /// Returns the animal's observations in `range`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AnimalNotFound`] if the animal is absent or
    /// foreign, [`TrackerError::Validation`] if `range` is inverted, or a
    /// store error.
    pub async fn list_observations(
        &self,
        owner: OwnerId,
        animal_id: AnimalId,
        range: DateRange,
    ) -> Result<Vec<WeightObservation>, TrackerError> {
        if let (Some(from), Some(to)) = (range.from, range.to)
            && from > to
        {
            return Err(TrackerError::Validation(
                "`from` must not be after `to`".to_string(),
            ));
        }
        self.get_animal(owner, animal_id).await?;
        self.observations.find_by_animal(animal_id, range).await
    }

    /// Statistics over the trailing `period_days` window ending now.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if `period_days` is outside
    /// `1..=MAX_PERIOD_DAYS`, [`TrackerError::AnimalNotFound`] if the animal
    /// is absent or foreign, or a store error.
    pub async fn weight_stats(
        &self,
        owner: OwnerId,
        animal_id: AnimalId,
        period_days: u32,
    ) -> Result<WeightStats, TrackerError> {
        validate_period(period_days)?;
        let animal = self.get_animal(owner, animal_id).await?;
        let window = self.window(animal_id, period_days, Utc::now()).await?;
        Ok(summarize(
            animal_id,
            period_days,
            &window,
            animal.summary.current_weight,
        ))
    }

    /// Side-by-side window series for several animals, in input order.
    ///
    /// All animals must exist and belong to `owner`; otherwise the whole
    /// request fails and nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] for an empty or oversized id
    /// list or any missing/foreign animal, [`TrackerError::Validation`] for
    /// an invalid period, or a store error.
    pub async fn compare_weights(
        &self,
        owner: OwnerId,
        animal_ids: &[AnimalId],
        period_days: u32,
    ) -> Result<Vec<ComparisonEntry>, TrackerError> {
        if animal_ids.is_empty() {
            return Err(TrackerError::InvalidInput(
                "animal_ids must contain at least one animal".to_string(),
            ));
        }
        if animal_ids.len() > self.max_compare_animals {
            return Err(TrackerError::InvalidInput(format!(
                "at most {} animals can be compared at once",
                self.max_compare_animals
            )));
        }
        validate_period(period_days)?;

        let mut animals = Vec::with_capacity(animal_ids.len());
        for &id in animal_ids {
            match self.get_animal(owner, id).await {
                Ok(animal) => animals.push(animal),
                Err(TrackerError::AnimalNotFound(_)) => {
                    return Err(TrackerError::InvalidInput(format!(
                        "animal {id} not found or not accessible"
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        let now = Utc::now();
        let mut entries = Vec::with_capacity(animals.len());
        for animal in &animals {
            let window = self.window(animal.id, period_days, now).await?;
            entries.push(comparison_entry(animal, &window));
        }
        Ok(entries)
    }

    // ── Internals ───────────────────────────────────────────────────────

    async fn window(
        &self,
        animal_id: AnimalId,
        period_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<WeightObservation>, TrackerError> {
        self.observations
            .find_by_animal(animal_id, DateRange::trailing_days(now, period_days))
            .await
    }

    async fn write_summary(
        &self,
        animal_id: AnimalId,
        observation: &WeightObservation,
    ) -> Result<(), TrackerError> {
        let summary = AnimalWeightSummary::from_observation(observation);
        self.animals.update_summary(animal_id, summary).await?;
        let _ = self.event_bus.publish(WeightEvent::SummaryUpdated {
            animal_id,
            current_weight: observation.weight,
            last_weight_date: observation.record_date,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

fn validate_period(period_days: u32) -> Result<(), TrackerError> {
    if period_days == 0 || period_days > MAX_PERIOD_DAYS {
        return Err(TrackerError::Validation(format!(
            "period must be between 1 and {MAX_PERIOD_DAYS} days, got {period_days}"
        )));
    }
    Ok(())
}
