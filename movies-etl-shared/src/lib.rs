//! # Movies ETL Shared
//!
//! This crate defines the data structures shared by the movies ETL crates:
//! the closed set of synchronized entity types, the rows read from the
//! relational source, and the documents written to the search index.

pub mod types;

pub use types::document::{
    GenreDocument, MovieDocument, NamedRef, PersonDocument, PersonFilm, SearchDocument,
};
pub use types::entity_type::{EntityType, UnknownEntityType};
pub use types::source_row::{
    FilmGenreRef, FilmPersonRef, FilmWorkRow, GenreRow, PersonFilmRef, PersonRow, SourceRow,
};
