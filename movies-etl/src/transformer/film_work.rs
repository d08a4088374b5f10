use movies_etl_shared::{EntityType, MovieDocument, NamedRef, SearchDocument, SourceRow};

use super::{required, unexpected_row, PersonRole};
use crate::errors::TransformError;

/// Convert a `content.film_work` row into a `movies` document.
///
/// Persons are split into directors, actors and writers by role. A person
/// listed twice for the same role, or a genre listed twice, appears once.
pub fn transform_film_work(row: &SourceRow) -> Result<SearchDocument, TransformError> {
    let SourceRow::FilmWork(film) = row else {
        return Err(unexpected_row(EntityType::FilmWork, row));
    };
    let entity_type = EntityType::FilmWork;

    let title = required(film.title.as_deref(), entity_type, film.id, "title")?;

    let mut genres = Vec::with_capacity(film.genres.len());
    for genre in &film.genres {
        let name = required(genre.name.as_deref(), entity_type, film.id, "genres.name")?;
        push_unique(&mut genres, NamedRef::new(genre.id, name));
    }

    let mut directors = Vec::new();
    let mut actors = Vec::new();
    let mut writers = Vec::new();
    for person in &film.persons {
        let name = required(person.name.as_deref(), entity_type, film.id, "persons.name")?;
        let raw_role = required(person.role.as_deref(), entity_type, film.id, "persons.role")?;
        let role = PersonRole::parse(raw_role).ok_or_else(|| TransformError::UnknownRole {
            entity_type,
            id: film.id,
            role: raw_role.to_string(),
        })?;

        let target = match role {
            PersonRole::Director => &mut directors,
            PersonRole::Actor => &mut actors,
            PersonRole::Writer => &mut writers,
        };
        push_unique(target, NamedRef::new(person.id, name));
    }

    Ok(SearchDocument::Movie(MovieDocument {
        id: film.id,
        imdb_rating: film.rating,
        title: title.to_string(),
        description: film.description.clone(),
        directors_names: names(&directors),
        actors_names: names(&actors),
        writers_names: names(&writers),
        genres,
        directors,
        actors,
        writers,
    }))
}

fn push_unique(refs: &mut Vec<NamedRef>, named: NamedRef) {
    if !refs.iter().any(|existing| existing.id == named.id) {
        refs.push(named);
    }
}

fn names(refs: &[NamedRef]) -> Vec<String> {
    refs.iter().map(|named| named.name.clone()).collect()
}
