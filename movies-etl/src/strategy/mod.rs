//! Static per-entity strategy table.
//!
//! Everything that differs between entity types is resolved here once, so the
//! run loop itself never branches on table or index names.

use movies_etl_repository::opensearch::{
    genres_index_settings, movies_index_settings, persons_index_settings, GENRES_INDEX,
    MOVIES_INDEX, PERSONS_INDEX,
};
use movies_etl_shared::{EntityType, SearchDocument, SourceRow};
use serde_json::Value;

use crate::errors::TransformError;
use crate::transformer::{transform_film_work, transform_genre, transform_person};

/// How one entity type is indexed.
#[derive(Debug)]
pub struct EntityStrategy {
    pub entity_type: EntityType,
    /// Target index name.
    pub index_name: &'static str,
    /// Builds the index body (settings and mappings).
    pub index_settings: fn() -> Value,
    /// Converts one source row into its document.
    pub transform: fn(&SourceRow) -> Result<SearchDocument, TransformError>,
}

static FILM_WORK_STRATEGY: EntityStrategy = EntityStrategy {
    entity_type: EntityType::FilmWork,
    index_name: MOVIES_INDEX,
    index_settings: movies_index_settings,
    transform: transform_film_work,
};

static GENRE_STRATEGY: EntityStrategy = EntityStrategy {
    entity_type: EntityType::Genre,
    index_name: GENRES_INDEX,
    index_settings: genres_index_settings,
    transform: transform_genre,
};

static PERSON_STRATEGY: EntityStrategy = EntityStrategy {
    entity_type: EntityType::Person,
    index_name: PERSONS_INDEX,
    index_settings: persons_index_settings,
    transform: transform_person,
};

/// Look up the strategy for an entity type.
pub fn strategy_for(entity_type: EntityType) -> &'static EntityStrategy {
    match entity_type {
        EntityType::FilmWork => &FILM_WORK_STRATEGY,
        EntityType::Genre => &GENRE_STRATEGY,
        EntityType::Person => &PERSON_STRATEGY,
    }
}

/// Strategies for the given entity types, in the given order.
pub fn strategies_for(entity_types: &[EntityType]) -> Vec<&'static EntityStrategy> {
    entity_types.iter().copied().map(strategy_for).collect()
}
