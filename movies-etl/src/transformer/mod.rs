//! Transformer module for the movies ETL.
//!
//! Turns source rows into the documents stored in the search indexes. The
//! conversion is a pure function of the row: the same row always yields the
//! same document, so replaying a batch overwrites documents with identical
//! content.

mod film_work;
mod genre;
mod person;

pub use film_work::transform_film_work;
pub use genre::transform_genre;
pub use person::transform_person;

use movies_etl_shared::{EntityType, SearchDocument, SourceRow};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::TransformError;
use crate::strategy::strategy_for;

/// Role a person plays in a film.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PersonRole {
    Actor,
    Director,
    Writer,
}

impl PersonRole {
    /// Parse a role as stored in `content.person_film_work.role`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "actor" => Some(Self::Actor),
            "director" => Some(Self::Director),
            "writer" => Some(Self::Writer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Director => "director",
            Self::Writer => "writer",
        }
    }
}

/// Converts batches of rows for any configured entity type.
#[derive(Debug, Default)]
pub struct Transformer {}

impl Transformer {
    /// Create a new transformer.
    pub fn new() -> Self {
        Self {}
    }

    /// Transform a batch of rows in order.
    ///
    /// The first row that cannot be converted fails the whole batch; rows
    /// after it are not looked at.
    #[instrument(skip(self, rows), fields(entity_type = %entity_type, row_count = rows.len()))]
    pub fn transform(
        &self,
        entity_type: EntityType,
        rows: &[SourceRow],
    ) -> Result<Vec<SearchDocument>, TransformError> {
        let strategy = strategy_for(entity_type);
        let documents = rows
            .iter()
            .map(|row| (strategy.transform)(row))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(document_count = documents.len(), "Transformed batch");

        Ok(documents)
    }
}

/// Return the trimmed value of a required field, or a missing-field error
/// when it is null or blank.
pub(crate) fn required<'a>(
    value: Option<&'a str>,
    entity_type: EntityType,
    id: Uuid,
    field: &'static str,
) -> Result<&'a str, TransformError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TransformError::MissingField {
            entity_type,
            id,
            field,
        }),
    }
}

pub(crate) fn unexpected_row(expected: EntityType, row: &SourceRow) -> TransformError {
    TransformError::UnexpectedRow {
        expected,
        actual: row.entity_type(),
        id: row.id(),
    }
}
