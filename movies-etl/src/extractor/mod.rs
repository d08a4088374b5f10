//! Extractor module for the movies ETL.
//!
//! Pulls rows changed after a watermark from the source, one bounded batch at
//! a time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use movies_etl_repository::SourceRepository;
use movies_etl_shared::{EntityType, SourceRow};
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;

/// One batch of changed rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedBatch {
    /// Rows ordered by `modified` ascending.
    pub rows: Vec<SourceRow>,
    /// Number of rows in the batch.
    pub batch_size: usize,
    /// `modified` of the last row, or the input watermark when empty.
    pub new_since: DateTime<Utc>,
}

impl ExtractedBatch {
    pub fn is_empty(&self) -> bool {
        self.batch_size == 0
    }
}

/// Reads changed rows through a [`SourceRepository`] under the retry policy.
pub struct Extractor {
    source: Arc<dyn SourceRepository>,
    retry: RetryPolicy,
}

impl Extractor {
    /// Create a new extractor.
    pub fn new(source: Arc<dyn SourceRepository>, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// Fetch up to `limit` rows of `entity_type` with `modified > since`.
    ///
    /// A batch that is not ordered by `modified` is rejected, since advancing
    /// the watermark past it could skip rows.
    #[instrument(skip(self), fields(entity_type = %entity_type, since = %since))]
    pub async fn extract(
        &self,
        entity_type: EntityType,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<ExtractedBatch, PipelineError> {
        let source = &self.source;
        let rows = self
            .retry
            .run("extract", move || {
                source.fetch_changed(entity_type, since, limit)
            })
            .await?;

        if let Some(position) = rows
            .windows(2)
            .position(|pair| pair[1].modified() < pair[0].modified())
        {
            return Err(PipelineError::UnorderedBatch {
                entity_type,
                position: position + 1,
            });
        }

        let batch_size = rows.len();
        let new_since = rows.last().map(SourceRow::modified).unwrap_or(since);

        if batch_size == 0 {
            debug!("No changed rows");
        } else {
            info!(batch_size = batch_size, new_since = %new_since, "Extracted batch");
        }

        Ok(ExtractedBatch {
            rows,
            batch_size,
            new_since,
        })
    }
}
