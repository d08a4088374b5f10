//! Rows read from the relational source.
//!
//! Columns that the database allows to be `NULL` are modelled as `Option` so
//! that a malformed row reaches the transformer intact and is rejected there
//! as a data error instead of failing the whole extraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::entity_type::EntityType;

/// A genre attached to a film work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmGenreRef {
    pub id: Uuid,
    pub name: Option<String>,
}

/// A person credited on a film work, with the role they played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmPersonRef {
    pub id: Uuid,
    pub name: Option<String>,
    pub role: Option<String>,
}

/// A film work a person took part in, with every role they played in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFilmRef {
    pub id: Uuid,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A `film_work` row with its genres and credited persons joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmWorkRow {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub genres: Vec<FilmGenreRef>,
    #[serde(default)]
    pub persons: Vec<FilmPersonRef>,
}

/// A `genre` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub modified: DateTime<Utc>,
}

/// A `person` row with the films they appear in joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub films: Vec<PersonFilmRef>,
}

/// A raw row of any synchronized entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRow {
    FilmWork(FilmWorkRow),
    Genre(GenreRow),
    Person(PersonRow),
}

impl SourceRow {
    /// The source identifier, which is also the document id in the index.
    pub fn id(&self) -> Uuid {
        match self {
            SourceRow::FilmWork(row) => row.id,
            SourceRow::Genre(row) => row.id,
            SourceRow::Person(row) => row.id,
        }
    }

    /// The row's last modification time, the column watermarks are taken from.
    pub fn modified(&self) -> DateTime<Utc> {
        match self {
            SourceRow::FilmWork(row) => row.modified,
            SourceRow::Genre(row) => row.modified,
            SourceRow::Person(row) => row.modified,
        }
    }

    /// The entity type this row belongs to.
    pub fn entity_type(&self) -> EntityType {
        match self {
            SourceRow::FilmWork(_) => EntityType::FilmWork,
            SourceRow::Genre(_) => EntityType::Genre,
            SourceRow::Person(_) => EntityType::Person,
        }
    }
}

impl From<FilmWorkRow> for SourceRow {
    fn from(row: FilmWorkRow) -> Self {
        SourceRow::FilmWork(row)
    }
}

impl From<GenreRow> for SourceRow {
    fn from(row: GenreRow) -> Self {
        SourceRow::Genre(row)
    }
}

impl From<PersonRow> for SourceRow {
    fn from(row: PersonRow) -> Self {
        SourceRow::Person(row)
    }
}
