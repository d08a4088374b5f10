//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use std::time::Duration;

use async_trait::async_trait;
use movies_etl_shared::SearchDocument;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary};

/// Error type OpenSearch reports when creating an index that already exists.
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// OpenSearch provider implementation.
///
/// # Example
///
/// ```ignore
/// use movies_etl_repository::opensearch::{genres_index_settings, GENRES_INDEX};
/// let provider = OpenSearchProvider::new("http://localhost:9200", Duration::from_secs(30))?;
///
/// if !provider.index_exists(GENRES_INDEX).await? {
///     provider.create_index(GENRES_INDEX, &genres_index_settings()).await?;
/// }
/// let summary = provider.bulk_index_documents(GENRES_INDEX, &documents).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider for the specified URL.
    ///
    /// No request is sent here; an unreachable cluster surfaces on the first
    /// call.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `timeout` - Upper bound on every request
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or the transport cannot be built
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            timeout_secs = timeout.as_secs(),
            "Created OpenSearch provider"
        );

        Ok(Self { client })
    }

    /// Build the NDJSON body of a bulk request: an `index` action carrying the
    /// document id, followed by the document source, for every document.
    fn bulk_body(documents: &[SearchDocument]) -> Result<Vec<JsonBody<Value>>, SearchIndexError> {
        let mut body = Vec::with_capacity(documents.len() * 2);

        for document in documents {
            let source = serde_json::to_value(document)
                .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
            body.push(JsonBody::new(
                json!({ "index": { "_id": document.document_id() } }),
            ));
            body.push(JsonBody::new(source));
        }

        Ok(body)
    }

    /// Turn a bulk response body into per-document results.
    ///
    /// OpenSearch returns one item per action, in request order. An item is
    /// successful when it carries no `error` and a 2xx status.
    fn parse_bulk_response(
        documents: &[SearchDocument],
        response: &Value,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let items = response["items"]
            .as_array()
            .ok_or_else(|| SearchIndexError::parse("bulk response has no items array"))?;

        if items.len() != documents.len() {
            return Err(SearchIndexError::parse(format!(
                "bulk response has {} items for {} documents",
                items.len(),
                documents.len()
            )));
        }

        let results = documents
            .iter()
            .zip(items)
            .map(|(document, item)| {
                let outcome = item
                    .as_object()
                    .and_then(|actions| actions.values().next())
                    .unwrap_or(&Value::Null);

                let document_id = outcome["_id"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| document.document_id());

                let status = outcome["status"].as_u64().unwrap_or(0);
                let error = match &outcome["error"] {
                    Value::Null => None,
                    Value::Object(details) => Some(format!(
                        "{}: {}",
                        details
                            .get("type")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown"),
                        details
                            .get("reason")
                            .and_then(Value::as_str)
                            .unwrap_or("no reason given")
                    )),
                    other => Some(other.to_string()),
                };

                let success = error.is_none() && (200..300).contains(&status);
                BatchOperationResult {
                    document_id,
                    success,
                    error: (!success).then(|| {
                        SearchIndexError::index(
                            error.unwrap_or_else(|| format!("unexpected status {}", status)),
                        )
                    }),
                }
            })
            .collect();

        Ok(BatchOperationSummary::from_results(results))
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::index_lookup(format!(
                "Index exists check for '{}' returned status {}",
                index, status
            ))),
        }
    }

    async fn create_index(&self, index: &str, settings: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(settings.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!(index = %index, "Index created");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        if status.as_u16() == 400 && error_body.contains(ALREADY_EXISTS) {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        error!(index = %index, status = %status, body = %error_body, "Create index request failed");
        Err(SearchIndexError::index_creation(format!(
            "Create index '{}' failed with status {}: {}",
            index, status, error_body
        )))
    }

    async fn bulk_index_documents(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        let body = Self::bulk_body(documents)?;

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk request to '{}' failed with status {}: {}",
                index, status, error_body
            )));
        }

        let response_body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let summary = Self::parse_bulk_response(documents, &response_body)?;
        debug!(
            index = %index,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }
}
