//! Dependency initialization and wiring for the movies ETL.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::{Settings, StateBackend};
use crate::extractor::Extractor;
use crate::loader::SearchLoader;
use crate::orchestrator::Orchestrator;
use crate::strategy::strategies_for;
use crate::transformer::Transformer;
use crate::IndexingError;
use movies_etl_repository::{
    JsonFileWatermarkStore, OpenSearchProvider, PostgresSourceRepository, PostgresWatermarkStore,
    WatermarkStore,
};

/// How long to wait for a pooled PostgreSQL connection.
const DATABASE_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Wire every component from validated settings.
    ///
    /// The PostgreSQL pool connects lazily, so an unreachable database shows
    /// up as retried extraction failures rather than a startup error. The one
    /// exception is the `postgres` watermark backend, whose table is migrated
    /// here under the retry policy.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a client cannot be built or the watermark
    ///   table cannot be prepared
    pub async fn new(settings: Settings) -> Result<Self, IndexingError> {
        info!(
            database = ?settings.database,
            database_max_connections = settings.database_max_connections,
            opensearch_url = %settings.opensearch_url,
            state_backend = ?settings.state_backend,
            max_attempts = settings.retry.max_attempts(),
            "Initializing dependencies"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .acquire_timeout(Duration::from_secs(DATABASE_ACQUIRE_TIMEOUT_SECS))
            .connect_lazy_with(settings.database.connect_options()?);

        let source = Arc::new(PostgresSourceRepository::new(pool.clone()));

        let watermarks: Arc<dyn WatermarkStore> = match &settings.state_backend {
            StateBackend::Postgres => {
                let store = PostgresWatermarkStore::new(pool.clone());
                let store_ref = &store;
                settings
                    .retry
                    .run("migrate_etl_state", move || store_ref.migrate())
                    .await
                    .map_err(|e| {
                        IndexingError::config(format!("Failed to prepare etl_state table: {}", e))
                    })?;
                info!("PostgreSQL watermark store ready");
                Arc::new(store)
            }
            StateBackend::File(path) => {
                info!(path = %path.display(), "Using file watermark store");
                Arc::new(JsonFileWatermarkStore::new(path.clone()))
            }
        };

        let provider = OpenSearchProvider::new(&settings.opensearch_url, settings.opensearch_timeout)
            .map_err(|e| {
                IndexingError::config(format!("Failed to create OpenSearch provider: {}", e))
            })?;

        info!("OpenSearch client created");

        let extractor = Extractor::new(source, settings.retry);
        let transformer = Transformer::new();
        let loader = SearchLoader::new(Arc::new(provider), settings.retry);

        let orchestrator = Orchestrator::with_config(
            strategies_for(&settings.entities),
            watermarks,
            extractor,
            transformer,
            loader,
            settings.orchestrator.clone(),
        );

        Ok(Self { orchestrator })
    }
}
