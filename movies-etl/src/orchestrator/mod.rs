//! Orchestrator module for the movies ETL.
//!
//! Drives every configured entity through the incremental loop
//! (fetch watermark, extract, transform, load, advance watermark) and runs
//! that loop on a fixed interval until shutdown.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use movies_etl_repository::{BatchOperationSummary, WatermarkStore};
use movies_etl_shared::EntityType;
use tokio::time::{sleep, Duration};
use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::extractor::{ExtractedBatch, Extractor};
use crate::loader::SearchLoader;
use crate::strategy::EntityStrategy;
use crate::transformer::Transformer;

/// What to do with the watermark when the index rejects some documents of a
/// batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialFailurePolicy {
    /// Advance past the whole batch; rejected documents are only logged.
    #[default]
    Advance,
    /// Advance only up to the rows before the first rejected one and end the
    /// entity's run, so the next cycle extracts the rejected rows again.
    Hold,
}

impl FromStr for PartialFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "advance" => Ok(Self::Advance),
            "hold" => Ok(Self::Hold),
            other => Err(format!(
                "unknown partial failure policy '{}', expected 'advance' or 'hold'",
                other
            )),
        }
    }
}

impl fmt::Display for PartialFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advance => write!(f, "advance"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of rows per extracted batch.
    pub batch_size: usize,
    /// Pause between two cycles.
    pub interval: Duration,
    pub partial_failure_policy: PartialFailurePolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            interval: Duration::from_secs(60),
            partial_failure_policy: PartialFailurePolicy::default(),
        }
    }
}

/// Outcome of one entity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRunReport {
    pub entity_type: EntityType,
    /// Non-empty batches processed.
    pub batches: usize,
    pub rows_extracted: usize,
    pub documents_written: usize,
    pub documents_failed: usize,
    /// Last persisted watermark, if it was read at all.
    pub watermark: Option<DateTime<Utc>>,
}

impl EntityRunReport {
    fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            batches: 0,
            rows_extracted: 0,
            documents_written: 0,
            documents_failed: 0,
            watermark: None,
        }
    }
}

/// Result of one entity run within a cycle.
pub type EntityOutcome = (EntityType, Result<EntityRunReport, PipelineError>);

/// Orchestrator that coordinates the pipeline components.
///
/// Entities are processed one at a time, in the configured order. Within an
/// entity, a batch is only extracted after the previous batch's watermark has
/// been persisted.
pub struct Orchestrator {
    entities: Vec<&'static EntityStrategy>,
    watermarks: Arc<dyn WatermarkStore>,
    extractor: Extractor,
    transformer: Transformer,
    loader: SearchLoader,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        entities: Vec<&'static EntityStrategy>,
        watermarks: Arc<dyn WatermarkStore>,
        extractor: Extractor,
        transformer: Transformer,
        loader: SearchLoader,
    ) -> Self {
        Self::with_config(
            entities,
            watermarks,
            extractor,
            transformer,
            loader,
            OrchestratorConfig::default(),
        )
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        entities: Vec<&'static EntityStrategy>,
        watermarks: Arc<dyn WatermarkStore>,
        extractor: Extractor,
        transformer: Transformer,
        loader: SearchLoader,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            entities,
            watermarks,
            extractor,
            transformer,
            loader,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run cycles until Ctrl-C is received.
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for the shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run cycles, sleeping `interval` between them, until `shutdown`
    /// completes.
    ///
    /// Shutdown abandons the cycle in flight; the watermark stays at whatever
    /// was last persisted, so the abandoned batch is extracted again on the
    /// next start.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            entities = ?self.entities.iter().map(|s| s.entity_type.as_str()).collect::<Vec<_>>(),
            batch_size = self.config.batch_size,
            interval_secs = self.config.interval.as_secs(),
            partial_failure_policy = %self.config.partial_failure_policy,
            "Starting movies ETL orchestrator"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = self.run_cycle() => {}
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }

            tokio::select! {
                _ = sleep(self.config.interval) => {}
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        info!("Movies ETL orchestrator stopped");
    }

    /// Run every configured entity once.
    ///
    /// A failing entity is logged and skipped; the remaining entities still
    /// run.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Vec<EntityOutcome> {
        let mut outcomes = Vec::with_capacity(self.entities.len());

        for strategy in &self.entities {
            let outcome = self.run_entity(strategy).await;
            outcomes.push((strategy.entity_type, outcome));
        }

        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            entities = outcomes.len(),
            failed = failed,
            "Cycle completed"
        );

        outcomes
    }

    /// Sync one entity until it has caught up with the source.
    ///
    /// Errors are logged here with the entity type, the last persisted
    /// watermark and the cause before being returned.
    #[instrument(skip(self, strategy), fields(entity_type = %strategy.entity_type))]
    pub async fn run_entity(
        &self,
        strategy: &EntityStrategy,
    ) -> Result<EntityRunReport, PipelineError> {
        let mut report = EntityRunReport::new(strategy.entity_type);

        match self.sync_entity(strategy, &mut report).await {
            Ok(()) => {
                info!(
                    batches = report.batches,
                    rows_extracted = report.rows_extracted,
                    documents_written = report.documents_written,
                    documents_failed = report.documents_failed,
                    watermark = ?report.watermark,
                    "Entity run completed"
                );
                Ok(report)
            }
            Err(e) => {
                error!(
                    watermark = ?report.watermark,
                    batches = report.batches,
                    data_error = e.is_data_error(),
                    error = %e,
                    "Entity run failed"
                );
                Err(e)
            }
        }
    }

    async fn sync_entity(
        &self,
        strategy: &EntityStrategy,
        report: &mut EntityRunReport,
    ) -> Result<(), PipelineError> {
        let entity_type = strategy.entity_type;
        let batch_size = self.config.batch_size;

        self.loader
            .ensure_index(strategy.index_name, &(strategy.index_settings)())
            .await?;

        let mut since = self.watermarks.get_last_state(entity_type).await?;
        report.watermark = Some(since);

        loop {
            let batch = self.extractor.extract(entity_type, since, batch_size).await?;
            if batch.is_empty() {
                return Ok(());
            }
            report.batches += 1;
            report.rows_extracted += batch.batch_size;

            let documents = self.transformer.transform(entity_type, &batch.rows)?;
            let summary = self.loader.load(strategy.index_name, &documents).await?;
            report.documents_written += summary.succeeded;
            report.documents_failed += summary.failed;

            let (next, held) = self.next_watermark(since, &batch, &summary);
            if next > since {
                self.watermarks.set_last_state(entity_type, next).await?;
                info!(watermark = %next, "Advanced watermark");
                since = next;
                report.watermark = Some(next);
            }

            if held || batch.batch_size < batch_size {
                return Ok(());
            }
        }
    }

    /// Watermark to persist after loading `batch`, and whether the run has to
    /// stop early because rejected rows were held back.
    fn next_watermark(
        &self,
        since: DateTime<Utc>,
        batch: &ExtractedBatch,
        summary: &BatchOperationSummary,
    ) -> (DateTime<Utc>, bool) {
        let Some(position) = summary.first_failure() else {
            return (batch.new_since, false);
        };

        match self.config.partial_failure_policy {
            PartialFailurePolicy::Advance => {
                warn!(
                    failed = summary.failed,
                    watermark = %batch.new_since,
                    "Advancing watermark past rejected documents"
                );
                (batch.new_since, false)
            }
            PartialFailurePolicy::Hold => {
                let Some(rejected) = batch.rows.get(position) else {
                    return (batch.new_since, false);
                };
                let rejected_modified = rejected.modified();
                // Rows sharing the rejected row's timestamp must be extracted
                // again too, since the lower bound is exclusive.
                let held = batch.rows[..position]
                    .iter()
                    .rev()
                    .map(|row| row.modified())
                    .find(|modified| *modified < rejected_modified)
                    .unwrap_or(since)
                    .max(since);

                warn!(
                    failed = summary.failed,
                    document_id = %rejected.id(),
                    watermark = %held,
                    "Holding watermark before the first rejected document"
                );
                (held, true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_failure_policy_parse() {
        assert_eq!(
            "advance".parse::<PartialFailurePolicy>(),
            Ok(PartialFailurePolicy::Advance)
        );
        assert_eq!(
            " HOLD ".parse::<PartialFailurePolicy>(),
            Ok(PartialFailurePolicy::Hold)
        );
        assert!("skip".parse::<PartialFailurePolicy>().is_err());
        assert_eq!(PartialFailurePolicy::Hold.to_string(), "hold");
    }

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.partial_failure_policy, PartialFailurePolicy::Advance);
    }
}
