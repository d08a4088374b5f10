//! PostgreSQL implementation of the source repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_etl_shared::{EntityType, SourceRow};
use sqlx::PgPool;
use tracing::debug;

use crate::errors::SourceError;
use crate::interfaces::SourceRepository;
use crate::postgres::queries::query_template;

/// Reads changed rows from the `content` schema.
///
/// The pool only hands out connections; each call acquires one, runs a single
/// query and returns it to the pool when the call completes.
pub struct PostgresSourceRepository {
    pool: PgPool,
}

impl PostgresSourceRepository {
    /// Create a source repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceRepository for PostgresSourceRepository {
    async fn fetch_changed(
        &self,
        entity_type: EntityType,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SourceRow>, SourceError> {
        let template = query_template(entity_type);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|e| SourceError::connection(e.to_string()))?;

        let rows = sqlx::query(template.sql)
            .bind(since)
            .bind(limit)
            .fetch_all(&mut *connection)
            .await?;

        debug!(
            entity_type = %entity_type,
            since = %since,
            row_count = rows.len(),
            "Fetched changed rows"
        );

        rows.iter()
            .map(|row| (template.decode)(row).map_err(SourceError::from))
            .collect()
    }
}
