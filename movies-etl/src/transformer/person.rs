use movies_etl_shared::{EntityType, PersonDocument, PersonFilm, SearchDocument, SourceRow};

use super::{required, unexpected_row, PersonRole};
use crate::errors::TransformError;

/// Convert a `content.person` row into a `persons` document.
///
/// Each film's roles are normalized, deduplicated and sorted.
pub fn transform_person(row: &SourceRow) -> Result<SearchDocument, TransformError> {
    let SourceRow::Person(person) = row else {
        return Err(unexpected_row(EntityType::Person, row));
    };
    let entity_type = EntityType::Person;

    let name = required(person.full_name.as_deref(), entity_type, person.id, "full_name")?;

    let mut films: Vec<PersonFilm> = Vec::with_capacity(person.films.len());
    for film in &person.films {
        let mut roles = Vec::with_capacity(film.roles.len());
        for raw_role in &film.roles {
            let role = PersonRole::parse(raw_role).ok_or_else(|| TransformError::UnknownRole {
                entity_type,
                id: person.id,
                role: raw_role.clone(),
            })?;
            roles.push(role);
        }

        match films.iter_mut().find(|existing| existing.id == film.id) {
            Some(existing) => {
                existing
                    .roles
                    .extend(roles.iter().map(|role| role.as_str().to_string()));
            }
            None => films.push(PersonFilm {
                id: film.id,
                roles: roles.iter().map(|role| role.as_str().to_string()).collect(),
            }),
        }
    }

    for film in &mut films {
        film.roles.sort();
        film.roles.dedup();
    }

    Ok(SearchDocument::Person(PersonDocument {
        id: person.id,
        name: name.to_string(),
        films,
    }))
}
