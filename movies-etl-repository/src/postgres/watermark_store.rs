//! PostgreSQL implementation of the watermark store.
//!
//! Stores watermarks in an `etl_state` table so the pipeline resumes where it
//! left off after a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_etl_shared::EntityType;
use sqlx::PgPool;

use crate::errors::WatermarkError;
use crate::interfaces::{initial_watermark, WatermarkStore};

/// PostgreSQL-backed watermark store.
///
/// Upserts keep the greater of the stored and the new value, so a stale
/// writer can never move a watermark backwards.
pub struct PostgresWatermarkStore {
    /// PostgreSQL connection pool
    pool: PgPool,
}

impl PostgresWatermarkStore {
    /// Creates a new PostgreSQL watermark store.
    ///
    /// # Arguments
    ///
    /// * `pool` - Connection pool for the database holding the `etl_state` table
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `etl_state` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), WatermarkError> {
        sqlx::migrate!("src/postgres/migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WatermarkStore for PostgresWatermarkStore {
    async fn get_last_state(
        &self,
        entity_type: EntityType,
    ) -> Result<DateTime<Utc>, WatermarkError> {
        let stored = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT last_modified FROM etl_state WHERE entity_type = $1",
        )
        .bind(entity_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(stored.unwrap_or_else(initial_watermark))
    }

    async fn set_last_state(
        &self,
        entity_type: EntityType,
        modified: DateTime<Utc>,
    ) -> Result<(), WatermarkError> {
        sqlx::query(
            "INSERT INTO etl_state (entity_type, last_modified, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (entity_type) DO UPDATE \
             SET last_modified = GREATEST(etl_state.last_modified, EXCLUDED.last_modified), \
                 updated_at = now()",
        )
        .bind(entity_type.as_str())
        .bind(modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
