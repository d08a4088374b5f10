//! # Movies ETL Repository
//!
//! This crate provides the storage seams of the movies ETL as traits, together
//! with their concrete implementations:
//!
//! - [`SourceRepository`]: reads changed rows from the relational source
//!   ([`PostgresSourceRepository`]).
//! - [`WatermarkStore`]: persists per-entity watermarks
//!   ([`PostgresWatermarkStore`], [`JsonFileWatermarkStore`]).
//! - [`SearchIndexProvider`]: index lifecycle and bulk writes
//!   ([`OpenSearchProvider`]).

pub mod errors;
pub mod file;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;
pub mod types;

pub use errors::{SearchIndexError, SourceError, WatermarkError};
pub use file::JsonFileWatermarkStore;
pub use interfaces::{initial_watermark, SearchIndexProvider, SourceRepository, WatermarkStore};
pub use opensearch::OpenSearchProvider;
pub use postgres::{PostgresSourceRepository, PostgresWatermarkStore};
pub use types::{BatchOperationResult, BatchOperationSummary};
