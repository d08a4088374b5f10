//! Document types for the search indexes.
//!
//! Field names and shapes here are the contract with the read service that
//! queries the indexes, and must stay in line with the index mappings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An `{id, name}` pair used for genres and credited persons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

impl NamedRef {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Document stored in the `movies` index.
///
/// Persons are split per role into nested `{id, name}` arrays, with a flat
/// array of names next to each one for full-text matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDocument {
    pub id: Uuid,
    pub imdb_rating: Option<f64>,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<NamedRef>,
    pub directors: Vec<NamedRef>,
    pub actors: Vec<NamedRef>,
    pub writers: Vec<NamedRef>,
    pub directors_names: Vec<String>,
    pub actors_names: Vec<String>,
    pub writers_names: Vec<String>,
}

/// Document stored in the `genres` index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDocument {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A film a person took part in, as stored on the person document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFilm {
    pub id: Uuid,
    pub roles: Vec<String>,
}

/// Document stored in the `persons` index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDocument {
    pub id: Uuid,
    pub name: String,
    pub films: Vec<PersonFilm>,
}

/// Any index-ready document.
///
/// Serializes as the bare inner document, which is exactly the `_source`
/// written to the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchDocument {
    Movie(MovieDocument),
    Genre(GenreDocument),
    Person(PersonDocument),
}

impl SearchDocument {
    /// The source identifier this document was derived from.
    pub fn id(&self) -> Uuid {
        match self {
            SearchDocument::Movie(doc) => doc.id,
            SearchDocument::Genre(doc) => doc.id,
            SearchDocument::Person(doc) => doc.id,
        }
    }

    /// The `_id` used in the index.
    ///
    /// Stable across reloads, so writing the same row twice overwrites the
    /// existing document instead of creating a second one.
    pub fn document_id(&self) -> String {
        self.id().to_string()
    }
}

impl From<MovieDocument> for SearchDocument {
    fn from(doc: MovieDocument) -> Self {
        SearchDocument::Movie(doc)
    }
}

impl From<GenreDocument> for SearchDocument {
    fn from(doc: GenreDocument) -> Self {
        SearchDocument::Genre(doc)
    }
}

impl From<PersonDocument> for SearchDocument {
    fn from(doc: PersonDocument) -> Self {
        SearchDocument::Person(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_source_id() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let doc: SearchDocument = GenreDocument {
            id,
            name: "Comedy".to_string(),
            description: None,
        }
        .into();

        assert_eq!(doc.id(), id);
        assert_eq!(doc.document_id(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_search_document_serializes_untagged() {
        let id = Uuid::new_v4();
        let doc: SearchDocument = PersonDocument {
            id,
            name: "George Lucas".to_string(),
            films: vec![PersonFilm {
                id: Uuid::new_v4(),
                roles: vec!["director".to_string()],
            }],
        }
        .into();

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], id.to_string());
        assert_eq!(value["name"], "George Lucas");
        assert_eq!(value["films"][0]["roles"][0], "director");
        assert!(value.get("Person").is_none());
    }

    #[test]
    fn test_movie_document_keeps_null_fields() {
        let doc = MovieDocument {
            id: Uuid::new_v4(),
            imdb_rating: None,
            title: "Untitled".to_string(),
            description: None,
            genres: vec![],
            directors: vec![],
            actors: vec![],
            writers: vec![],
            directors_names: vec![],
            actors_names: vec![],
            writers_names: vec![],
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["imdb_rating"].is_null());
        assert!(value["description"].is_null());
        assert!(value["actors"].as_array().unwrap().is_empty());
    }
}
