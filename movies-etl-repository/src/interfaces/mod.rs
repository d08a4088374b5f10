//! Interface definitions for the storage seams of the ETL.
//!
//! This module defines the abstract traits that allow for dependency
//! injection and swappable backends in the pipeline.

mod search_index_provider;
mod source_repository;
mod watermark_store;

pub use search_index_provider::SearchIndexProvider;
pub use source_repository::SourceRepository;
pub use watermark_store::{initial_watermark, WatermarkStore};
