//! OpenSearch index configuration and mappings.
//!
//! This module defines the settings and mappings of the `movies`, `genres`
//! and `persons` indexes. The field names and types are the contract with the
//! read service and must match the document types in `movies-etl-shared`.

use serde_json::{json, Value};

/// Index holding one document per film work.
pub const MOVIES_INDEX: &str = "movies";

/// Index holding one document per genre.
pub const GENRES_INDEX: &str = "genres";

/// Index holding one document per person.
pub const PERSONS_INDEX: &str = "persons";

/// Settings shared by every index: a single shard with one replica and an
/// analyzer that handles both English and Russian text.
fn base_settings() -> Value {
    json!({
        "number_of_shards": 1,
        "number_of_replicas": 1,
        "refresh_interval": "1s",
        "analysis": {
            "filter": {
                "english_stop": { "type": "stop", "stopwords": "_english_" },
                "english_stemmer": { "type": "stemmer", "language": "english" },
                "english_possessive_stemmer": { "type": "stemmer", "language": "possessive_english" },
                "russian_stop": { "type": "stop", "stopwords": "_russian_" },
                "russian_stemmer": { "type": "stemmer", "language": "russian" }
            },
            "analyzer": {
                "ru_en": {
                    "tokenizer": "standard",
                    "filter": [
                        "lowercase",
                        "english_stop",
                        "english_stemmer",
                        "english_possessive_stemmer",
                        "russian_stop",
                        "russian_stemmer"
                    ]
                }
            }
        }
    })
}

/// A full-text field with an exact-match `raw` subfield for sorting.
fn text_with_raw() -> Value {
    json!({
        "type": "text",
        "analyzer": "ru_en",
        "fields": {
            "raw": { "type": "keyword" }
        }
    })
}

/// A nested `{id, name}` collection.
fn nested_named_ref() -> Value {
    json!({
        "type": "nested",
        "dynamic": "strict",
        "properties": {
            "id": { "type": "keyword" },
            "name": { "type": "text", "analyzer": "ru_en" }
        }
    })
}

/// Get the settings and mappings for the `movies` index.
///
/// - **Nested collections** for genres and for each person role, so the read
///   service can filter on `genres.id` or `actors.id`
/// - **Flat name arrays** per role for full-text matching
/// - **float** rating for sorting
pub fn movies_index_settings() -> Value {
    json!({
        "settings": base_settings(),
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "id": { "type": "keyword" },
                "imdb_rating": { "type": "float" },
                "title": text_with_raw(),
                "description": { "type": "text", "analyzer": "ru_en" },
                "genres": nested_named_ref(),
                "directors": nested_named_ref(),
                "actors": nested_named_ref(),
                "writers": nested_named_ref(),
                "directors_names": { "type": "text", "analyzer": "ru_en" },
                "actors_names": { "type": "text", "analyzer": "ru_en" },
                "writers_names": { "type": "text", "analyzer": "ru_en" }
            }
        }
    })
}

/// Get the settings and mappings for the `genres` index.
pub fn genres_index_settings() -> Value {
    json!({
        "settings": base_settings(),
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "id": { "type": "keyword" },
                "name": text_with_raw(),
                "description": { "type": "text", "analyzer": "ru_en" }
            }
        }
    })
}

/// Get the settings and mappings for the `persons` index.
pub fn persons_index_settings() -> Value {
    json!({
        "settings": base_settings(),
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "id": { "type": "keyword" },
                "name": text_with_raw(),
                "films": {
                    "type": "nested",
                    "dynamic": "strict",
                    "properties": {
                        "id": { "type": "keyword" },
                        "roles": { "type": "keyword" }
                    }
                }
            }
        }
    })
}
