//! PostgreSQL implementation of the store traits.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{AnimalRow, WeightRecordRow};
use super::{AnimalStore, ObservationStore};
use crate::config::TrackerConfig;
use crate::domain::{
    Animal, AnimalId, AnimalWeightSummary, ChronoKey, DateRange, ObservationId, ObservationPatch,
    WeightObservation,
};
use crate::error::TrackerError;

const RECORD_COLUMNS: &str = "id, animal_id, owner_id, weight, unit, record_date, recorded_by, \
     notes, weight_change, change_percentage, growth_rate, created_at, updated_at";

const ANIMAL_COLUMNS: &str =
    "id, owner_id, name, species, current_weight, last_weight_date, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the pool settings in `config` and runs the bundled
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the connection or a migration
    /// fails.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| TrackerError::Storage(e.to_string()))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to postgres"
        );
        Ok(Self::new(pool))
    }
}

fn into_observations(rows: Vec<WeightRecordRow>) -> Result<Vec<WeightObservation>, TrackerError> {
    rows.into_iter().map(WeightObservation::try_from).collect()
}

#[async_trait]
impl ObservationStore for PostgresStore {
    async fn find_by_animal(
        &self,
        animal_id: AnimalId,
        range: DateRange,
    ) -> Result<Vec<WeightObservation>, TrackerError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM weight_records \
             WHERE animal_id = $1 \
               AND ($2::timestamptz IS NULL OR record_date >= $2) \
               AND ($3::timestamptz IS NULL OR record_date <= $3) \
             ORDER BY record_date ASC, created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, WeightRecordRow>(&sql)
            .bind(animal_id.as_uuid())
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await?;
        into_observations(rows)
    }

    async fn find_by_id(
        &self,
        id: ObservationId,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM weight_records WHERE id = $1");
        let row = sqlx::query_as::<_, WeightRecordRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(WeightObservation::try_from).transpose()
    }

    async fn find_latest(
        &self,
        animal_id: AnimalId,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM weight_records WHERE animal_id = $1 \
             ORDER BY record_date DESC, created_at DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, WeightRecordRow>(&sql)
            .bind(animal_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(WeightObservation::try_from).transpose()
    }

    async fn find_predecessor(
        &self,
        animal_id: AnimalId,
        key: ChronoKey,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM weight_records \
             WHERE animal_id = $1 AND id <> $4 \
               AND (record_date, created_at, id) < ($2, $3, $4) \
             ORDER BY record_date DESC, created_at DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, WeightRecordRow>(&sql)
            .bind(animal_id.as_uuid())
            .bind(key.record_date)
            .bind(key.created_at)
            .bind(key.id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(WeightObservation::try_from).transpose()
    }

    async fn insert(&self, observation: &WeightObservation) -> Result<(), TrackerError> {
        sqlx::query(
            "INSERT INTO weight_records (id, animal_id, owner_id, weight, unit, record_date, \
             recorded_by, notes, weight_change, change_percentage, growth_rate, created_at, \
             updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(observation.id.as_uuid())
        .bind(observation.animal_id.as_uuid())
        .bind(observation.owner_id.as_uuid())
        .bind(observation.weight)
        .bind(observation.unit.as_str())
        .bind(observation.record_date)
        .bind(observation.recorded_by.as_deref())
        .bind(observation.notes.as_deref())
        .bind(observation.weight_change)
        .bind(observation.change_percentage)
        .bind(observation.growth_rate)
        .bind(observation.created_at)
        .bind(observation.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        id: ObservationId,
        patch: &ObservationPatch,
    ) -> Result<Option<WeightObservation>, TrackerError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {RECORD_COLUMNS} FROM weight_records WHERE id = $1 FOR UPDATE");
        let Some(row) = sqlx::query_as::<_, WeightRecordRow>(&select)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut observation = WeightObservation::try_from(row)?;
        observation.apply(patch, Utc::now());

        sqlx::query(
            "UPDATE weight_records SET weight = $2, unit = $3, record_date = $4, \
             recorded_by = $5, notes = $6, weight_change = $7, change_percentage = $8, \
             growth_rate = $9, updated_at = $10 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(observation.weight)
        .bind(observation.unit.as_str())
        .bind(observation.record_date)
        .bind(observation.recorded_by.as_deref())
        .bind(observation.notes.as_deref())
        .bind(observation.weight_change)
        .bind(observation.change_percentage)
        .bind(observation.growth_rate)
        .bind(observation.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(observation))
    }

    async fn delete(&self, id: ObservationId) -> Result<bool, TrackerError> {
        let result = sqlx::query("DELETE FROM weight_records WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnimalStore for PostgresStore {
    async fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, TrackerError> {
        let sql = format!("SELECT {ANIMAL_COLUMNS} FROM animals WHERE id = $1");
        let row = sqlx::query_as::<_, AnimalRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Animal::from))
    }

    async fn insert(&self, animal: &Animal) -> Result<(), TrackerError> {
        sqlx::query(
            "INSERT INTO animals (id, owner_id, name, species, current_weight, \
             last_weight_date, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(animal.id.as_uuid())
        .bind(animal.owner_id.as_uuid())
        .bind(&animal.name)
        .bind(animal.species.as_deref())
        .bind(animal.summary.current_weight)
        .bind(animal.summary.last_weight_date)
        .bind(animal.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_summary(
        &self,
        id: AnimalId,
        summary: AnimalWeightSummary,
    ) -> Result<(), TrackerError> {
        let result = sqlx::query(
            "UPDATE animals SET current_weight = $2, last_weight_date = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(summary.current_weight)
        .bind(summary.last_weight_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::AnimalNotFound(*id.as_uuid()));
        }
        Ok(())
    }
}
