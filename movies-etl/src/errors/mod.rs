//! Error types for the movies ETL pipeline.

use movies_etl_repository::{SearchIndexError, SourceError, WatermarkError};
use movies_etl_shared::EntityType;
use thiserror::Error;
use uuid::Uuid;

/// A row that cannot be turned into a document.
///
/// Retrying would reproduce the same error, so these abort the entity run
/// without going through the retry policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("{entity_type} row {id} is missing required field '{field}'")]
    MissingField {
        entity_type: EntityType,
        id: Uuid,
        field: &'static str,
    },

    #[error("{entity_type} row {id} has unknown person role '{role}'")]
    UnknownRole {
        entity_type: EntityType,
        id: Uuid,
        role: String,
    },

    #[error("expected a {expected} row, got a {actual} row with id {id}")]
    UnexpectedRow {
        expected: EntityType,
        actual: EntityType,
        id: Uuid,
    },
}

/// Errors that abort a single entity's run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading from the source failed after exhausting retries.
    #[error("Extract error: {0}")]
    Extract(#[from] SourceError),

    /// The source returned rows that are not in ascending `modified` order.
    #[error("Batch for {entity_type} is not ordered by modified at position {position}")]
    UnorderedBatch {
        entity_type: EntityType,
        position: usize,
    },

    /// A row could not be transformed.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Checking for or creating the target index failed after exhausting retries.
    #[error("Index setup error: {0}")]
    IndexSetup(SearchIndexError),

    /// The bulk write failed after exhausting retries.
    #[error("Load error: {0}")]
    Load(#[from] SearchIndexError),

    /// Reading or persisting the watermark failed.
    #[error("Watermark error: {0}")]
    Watermark(#[from] WatermarkError),
}

impl PipelineError {
    /// Whether this error comes from the data itself rather than from an
    /// external system. Operators have to fix the source rows before the
    /// entity can make progress again.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Transform(_) | PipelineError::UnorderedBatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_message() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let err = TransformError::MissingField {
            entity_type: EntityType::Genre,
            id,
            field: "name",
        };
        assert_eq!(
            err.to_string(),
            "genre row 550e8400-e29b-41d4-a716-446655440000 is missing required field 'name'"
        );
    }

    #[test]
    fn test_data_errors_are_classified() {
        let transform = PipelineError::from(TransformError::UnknownRole {
            entity_type: EntityType::FilmWork,
            id: Uuid::new_v4(),
            role: "producer".to_string(),
        });
        assert!(transform.is_data_error());

        let unordered = PipelineError::UnorderedBatch {
            entity_type: EntityType::Person,
            position: 3,
        };
        assert!(unordered.is_data_error());

        let load = PipelineError::from(SearchIndexError::connection("refused"));
        assert!(!load.is_data_error());
    }
}
