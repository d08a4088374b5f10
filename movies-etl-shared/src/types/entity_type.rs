//! The closed set of entity types kept in sync with the search index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An entity type synchronized from the relational source.
///
/// Each variant maps to exactly one source table and one search index. The
/// string tag (`film_work`, `genre`, `person`) is the key under which the
/// entity's watermark is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    FilmWork,
    Genre,
    Person,
}

impl EntityType {
    /// Every entity type, in the default round-robin order.
    pub const ALL: [EntityType; 3] = [EntityType::FilmWork, EntityType::Genre, EntityType::Person];

    /// The stable string tag of this entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::FilmWork => "film_work",
            EntityType::Genre => "genre",
            EntityType::Person => "person",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a tag that does not name a known entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityType(pub String);

impl fmt::Display for UnknownEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity type '{}'", self.0)
    }
}

impl std::error::Error for UnknownEntityType {}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "film_work" => Ok(EntityType::FilmWork),
            "genre" => Ok(EntityType::Genre),
            "person" => Ok(EntityType::Person),
            _ => Err(UnknownEntityType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("film_work".parse::<EntityType>(), Ok(EntityType::FilmWork));
        assert_eq!(" Genre ".parse::<EntityType>(), Ok(EntityType::Genre));
        assert_eq!("PERSON".parse::<EntityType>(), Ok(EntityType::Person));
    }

    #[test]
    fn test_parse_unknown_tag() {
        let err = "movie".parse::<EntityType>().unwrap_err();
        assert_eq!(err, UnknownEntityType("movie".to_string()));
        assert_eq!(err.to_string(), "unknown entity type 'movie'");
    }

    #[test]
    fn test_display_matches_tag() {
        for entity_type in EntityType::ALL {
            assert_eq!(entity_type.to_string(), entity_type.as_str());
            assert_eq!(entity_type.as_str().parse::<EntityType>(), Ok(entity_type));
        }
    }

    #[test]
    fn test_serde_uses_snake_case_tag() {
        let json = serde_json::to_string(&EntityType::FilmWork).unwrap();
        assert_eq!(json, "\"film_work\"");
    }
}
