//! # Movies ETL
//!
//! Keeps the `movies`, `genres` and `persons` search indexes in sync with the
//! PostgreSQL source of record.
//!
//! ## Architecture
//!
//! Each entity type runs through the same incremental loop:
//!
//! 1. **Watermark**: the last processed `modified` timestamp is read
//! 2. **Extractor**: rows changed since the watermark are fetched in bounded,
//!    ascending batches
//! 3. **Transformer**: rows are turned into index documents
//! 4. **Loader**: documents are bulk-written to the index
//! 5. **Orchestrator**: advances the watermark and repeats until a short
//!    batch signals the entity has caught up, then moves to the next entity
//!
//! Every call to an external system goes through the shared [`RetryPolicy`].
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`strategy`]: Static per-entity strategy table
//! - [`extractor`]: Batched change detection against the source
//! - [`transformer`]: Row to document conversion
//! - [`loader`]: Index lifecycle and bulk writes
//! - [`retry`]: Bounded exponential backoff
//! - [`orchestrator`]: The per-entity run loop and the scheduling driver
//! - [`errors`]: Error types for the pipeline

pub mod config;
pub mod errors;
pub mod extractor;
pub mod loader;
pub mod orchestrator;
pub mod retry;
pub mod strategy;
pub mod transformer;

pub use config::{Dependencies, Settings};
pub use errors::{PipelineError, TransformError};
pub use retry::RetryPolicy;

use thiserror::Error;

/// Errors that can occur during ETL initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] PipelineError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
