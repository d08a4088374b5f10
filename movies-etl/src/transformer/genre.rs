use movies_etl_shared::{EntityType, GenreDocument, SearchDocument, SourceRow};

use super::{required, unexpected_row};
use crate::errors::TransformError;

/// Convert a `content.genre` row into a `genres` document.
pub fn transform_genre(row: &SourceRow) -> Result<SearchDocument, TransformError> {
    let SourceRow::Genre(genre) = row else {
        return Err(unexpected_row(EntityType::Genre, row));
    };

    let name = required(genre.name.as_deref(), EntityType::Genre, genre.id, "name")?;

    Ok(SearchDocument::Genre(GenreDocument {
        id: genre.id,
        name: name.to_string(),
        description: genre.description.clone(),
    }))
}
