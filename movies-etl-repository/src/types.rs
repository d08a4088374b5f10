//! Request and response types for search index operations.

use crate::errors::SearchIndexError;

/// Result of a bulk write for a single document.
///
/// This struct represents the outcome of one item within a bulk request. It
/// indicates whether the document was written and includes the reason it was
/// rejected otherwise.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document's `_id` in the index.
    pub document_id: String,
    /// Whether the document was written.
    pub success: bool,
    /// Error if the document was rejected.
    pub error: Option<SearchIndexError>,
}

/// Summary of a bulk write containing aggregate statistics and individual results.
///
/// Results are in request order, so `results[i]` describes the `i`-th document
/// that was sent. This lets callers map a rejection back to the source row it
/// came from.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of documents written.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-document results, computing the counts.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Position of the first rejected document, if any.
    pub fn first_failure(&self) -> Option<usize> {
        self.results.iter().position(|r| !r.success)
    }

    /// Whether any document in the batch was rejected.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, success: bool) -> BatchOperationResult {
        BatchOperationResult {
            document_id: id.to_string(),
            success,
            error: (!success).then(|| SearchIndexError::index("mapper_parsing_exception")),
        }
    }

    #[test]
    fn test_from_results_counts() {
        let summary = BatchOperationSummary::from_results(vec![
            result("a", true),
            result("b", false),
            result("c", true),
        ]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());
        assert_eq!(summary.first_failure(), Some(1));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchOperationSummary::from_results(vec![]);
        assert_eq!(summary.total, 0);
        assert!(!summary.has_failures());
        assert_eq!(summary.first_failure(), None);
    }
}
