//! Loader module for the movies ETL.
//!
//! Makes sure target indexes exist and bulk-writes documents into them.

use std::sync::Arc;

use movies_etl_repository::{BatchOperationSummary, SearchIndexError, SearchIndexProvider};
use movies_etl_shared::SearchDocument;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;

/// Loader that writes documents into the search engine.
///
/// The loader is responsible for:
/// - Creating a missing index with its mappings before anything is written
/// - Writing each batch with one bulk request, retried as a whole on failure
/// - Reporting documents the index rejected
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
    retry: RetryPolicy,
}

impl SearchLoader {
    /// Create a new search loader with the given provider.
    pub fn new(provider: Arc<dyn SearchIndexProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Create `index` with `settings` unless it already exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The index was created
    /// * `Ok(false)` - The index was already there
    #[instrument(skip(self, settings))]
    pub async fn ensure_index(&self, index: &str, settings: &Value) -> Result<bool, PipelineError> {
        let provider = &self.provider;
        let created = self
            .retry
            .run("ensure_index", move || async move {
                if provider.index_exists(index).await? {
                    return Ok::<bool, SearchIndexError>(false);
                }
                provider.create_index(index, settings).await?;
                Ok(true)
            })
            .await
            .map_err(PipelineError::IndexSetup)?;

        if created {
            info!(index = index, "Created index");
        } else {
            debug!(index = index, "Index already exists");
        }

        Ok(created)
    }

    /// Write `documents` into `index` with a single bulk request.
    ///
    /// Documents the index rejected do not fail the call; they are logged and
    /// reported in the returned summary, in the same order as `documents`.
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn load(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, PipelineError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        let provider = &self.provider;
        let summary = self
            .retry
            .run("bulk_load", move || {
                provider.bulk_index_documents(index, documents)
            })
            .await?;

        if summary.has_failures() {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk write completed with some failures"
            );
            for result in summary.results.iter().filter(|r| !r.success) {
                if let Some(ref err) = result.error {
                    error!(
                        document_id = %result.document_id,
                        error = %err,
                        "Failed to index document"
                    );
                } else {
                    error!(document_id = %result.document_id, "Failed to index document");
                }
            }
        } else {
            debug!(count = summary.succeeded, "Successfully indexed all documents");
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use movies_etl_repository::BatchOperationResult;
    use movies_etl_shared::GenreDocument;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    /// Mock search provider for testing.
    struct MockSearchProvider {
        exists: AtomicBool,
        exists_calls: AtomicUsize,
        lookup_failures_before_success: usize,
        created_count: AtomicUsize,
        bulk_calls: AtomicUsize,
        bulk_failures_before_success: usize,
        rejected_id: Option<String>,
    }

    impl MockSearchProvider {
        fn new() -> Self {
            Self {
                exists: AtomicBool::new(false),
                exists_calls: AtomicUsize::new(0),
                lookup_failures_before_success: 0,
                created_count: AtomicUsize::new(0),
                bulk_calls: AtomicUsize::new(0),
                bulk_failures_before_success: 0,
                rejected_id: None,
            }
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchProvider {
        async fn index_exists(&self, _index: &str) -> Result<bool, SearchIndexError> {
            let call = self.exists_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.lookup_failures_before_success {
                return Err(SearchIndexError::index_lookup("connection refused"));
            }
            Ok(self.exists.load(Ordering::SeqCst))
        }

        async fn create_index(
            &self,
            _index: &str,
            _settings: &Value,
        ) -> Result<(), SearchIndexError> {
            self.created_count.fetch_add(1, Ordering::SeqCst);
            self.exists.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            _index: &str,
            documents: &[SearchDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            let call = self.bulk_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.bulk_failures_before_success {
                return Err(SearchIndexError::bulk_index("503 Service Unavailable"));
            }

            let results = documents
                .iter()
                .map(|doc| {
                    let document_id = doc.document_id();
                    let rejected = self.rejected_id.as_deref() == Some(document_id.as_str());
                    BatchOperationResult {
                        document_id,
                        success: !rejected,
                        error: rejected.then(|| SearchIndexError::index("mapper_parsing_exception")),
                    }
                })
                .collect();
            Ok(BatchOperationSummary::from_results(results))
        }
    }

    fn genre_document(name: &str) -> SearchDocument {
        SearchDocument::Genre(GenreDocument {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
        })
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_ensure_index_creates_once() {
        let provider = Arc::new(MockSearchProvider::new());
        let loader = SearchLoader::new(provider.clone(), policy());
        let settings = serde_json::json!({ "mappings": {} });

        assert!(loader.ensure_index("genres", &settings).await.unwrap());
        assert!(!loader.ensure_index("genres", &settings).await.unwrap());
        assert_eq!(provider.created_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_index_retries_transient_failures() {
        let mut provider = MockSearchProvider::new();
        provider.lookup_failures_before_success = 2;
        let provider = Arc::new(provider);
        let loader = SearchLoader::new(provider.clone(), policy());
        let settings = serde_json::json!({ "mappings": {} });

        assert!(loader.ensure_index("genres", &settings).await.unwrap());
        assert_eq!(provider.exists_calls.load(Ordering::SeqCst), 3);
        assert_eq!(provider.created_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_index_fails_when_retries_exhausted() {
        let mut provider = MockSearchProvider::new();
        provider.lookup_failures_before_success = usize::MAX;
        let provider = Arc::new(provider);
        let loader = SearchLoader::new(provider.clone(), policy());
        let settings = serde_json::json!({ "mappings": {} });

        let err = loader.ensure_index("genres", &settings).await.unwrap_err();

        assert!(matches!(err, PipelineError::IndexSetup(_)));
        assert_eq!(provider.exists_calls.load(Ordering::SeqCst), 3);
        assert_eq!(provider.created_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_load_empty_batch_skips_request() {
        let provider = Arc::new(MockSearchProvider::new());
        let loader = SearchLoader::new(provider.clone(), policy());

        let summary = loader.load("genres", &[]).await.unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_load_reports_rejected_documents() {
        let documents = vec![genre_document("Drama"), genre_document("Comedy")];
        let mut provider = MockSearchProvider::new();
        provider.rejected_id = Some(documents[1].document_id());
        let loader = SearchLoader::new(Arc::new(provider), policy());

        let summary = loader.load("genres", &documents).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.first_failure(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_retries_failed_requests() {
        let mut provider = MockSearchProvider::new();
        provider.bulk_failures_before_success = 2;
        let provider = Arc::new(provider);
        let loader = SearchLoader::new(provider.clone(), policy());

        let summary = loader
            .load("genres", &[genre_document("Drama")])
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_fails_when_retries_exhausted() {
        let mut provider = MockSearchProvider::new();
        provider.bulk_failures_before_success = usize::MAX;
        let provider = Arc::new(provider);
        let loader = SearchLoader::new(provider.clone(), policy());

        let err = loader
            .load("genres", &[genre_document("Drama")])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Load(_)));
        assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 3);
    }
}
