//! Search index provider trait definition.
//!
//! This module defines the abstract interface for the search index operations
//! the pipeline needs, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory fakes in tests).

use async_trait::async_trait;
use movies_etl_shared::SearchDocument;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;

/// Abstracts the underlying search index implementation.
///
/// Every method is a single round-trip to the backend. Retrying is the
/// caller's concern.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether an index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` / `Ok(false)` - Whether the index exists
    /// * `Err(SearchIndexError)` - If the backend could not be reached
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create an index with the given settings and mappings.
    ///
    /// Creating an index that already exists is not an error, so two
    /// processes racing to create the same index both succeed.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    /// * `settings` - Index body with `settings` and `mappings`
    async fn create_index(&self, index: &str, settings: &Value) -> Result<(), SearchIndexError>;

    /// Write a batch of documents with a single bulk request.
    ///
    /// Each document is written under its stable document id, replacing any
    /// previous version.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - The request went through; individual
    ///   documents may still have been rejected and are reported per item
    /// * `Err(SearchIndexError)` - If the bulk request failed as a whole
    async fn bulk_index_documents(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;
}
