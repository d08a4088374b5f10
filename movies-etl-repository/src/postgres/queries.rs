//! Change-detection queries against the `content` schema.
//!
//! Every query binds `$1` to the exclusive lower bound on `modified` and `$2`
//! to the row limit, and returns rows in ascending `modified` order. Child
//! collections are aggregated to JSON in the same statement so the
//! transformer never has to go back to the database.

use movies_etl_shared::{
    EntityType, FilmGenreRef, FilmPersonRef, FilmWorkRow, GenreRow, PersonFilmRef, PersonRow,
    SourceRow,
};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;

/// A parameterized "rows changed since `$1`, limit `$2`" query and the
/// decoder for the rows it returns.
pub struct QueryTemplate {
    pub entity_type: EntityType,
    pub sql: &'static str,
    pub decode: fn(&PgRow) -> Result<SourceRow, sqlx::Error>,
}

const FILM_WORK_SQL: &str = r#"
SELECT
    fw.id,
    fw.title,
    fw.description,
    fw.rating::float8 AS rating,
    fw.modified,
    COALESCE(
        json_agg(DISTINCT jsonb_build_object('id', g.id, 'name', g.name))
            FILTER (WHERE g.id IS NOT NULL),
        '[]'
    ) AS genres,
    COALESCE(
        json_agg(DISTINCT jsonb_build_object('id', p.id, 'name', p.full_name, 'role', pfw.role))
            FILTER (WHERE p.id IS NOT NULL),
        '[]'
    ) AS persons
FROM content.film_work fw
LEFT JOIN content.genre_film_work gfw ON gfw.film_work_id = fw.id
LEFT JOIN content.genre g ON g.id = gfw.genre_id
LEFT JOIN content.person_film_work pfw ON pfw.film_work_id = fw.id
LEFT JOIN content.person p ON p.id = pfw.person_id
WHERE fw.modified > $1
GROUP BY fw.id
ORDER BY fw.modified ASC, fw.id ASC
LIMIT $2
"#;

const GENRE_SQL: &str = r#"
SELECT
    g.id,
    g.name,
    g.description,
    g.modified
FROM content.genre g
WHERE g.modified > $1
ORDER BY g.modified ASC, g.id ASC
LIMIT $2
"#;

const PERSON_SQL: &str = r#"
SELECT
    p.id,
    p.full_name,
    p.modified,
    COALESCE(
        json_agg(
            json_build_object('id', films.film_work_id, 'roles', films.roles)
            ORDER BY films.film_work_id
        ) FILTER (WHERE films.film_work_id IS NOT NULL),
        '[]'
    ) AS films
FROM content.person p
LEFT JOIN LATERAL (
    SELECT
        pfw.film_work_id,
        COALESCE(
            array_agg(DISTINCT pfw.role ORDER BY pfw.role) FILTER (WHERE pfw.role IS NOT NULL),
            '{}'
        ) AS roles
    FROM content.person_film_work pfw
    WHERE pfw.person_id = p.id
    GROUP BY pfw.film_work_id
) films ON TRUE
WHERE p.modified > $1
GROUP BY p.id
ORDER BY p.modified ASC, p.id ASC
LIMIT $2
"#;

pub static FILM_WORK_QUERY: QueryTemplate = QueryTemplate {
    entity_type: EntityType::FilmWork,
    sql: FILM_WORK_SQL,
    decode: decode_film_work,
};

pub static GENRE_QUERY: QueryTemplate = QueryTemplate {
    entity_type: EntityType::Genre,
    sql: GENRE_SQL,
    decode: decode_genre,
};

pub static PERSON_QUERY: QueryTemplate = QueryTemplate {
    entity_type: EntityType::Person,
    sql: PERSON_SQL,
    decode: decode_person,
};

/// The query template for an entity type.
pub fn query_template(entity_type: EntityType) -> &'static QueryTemplate {
    match entity_type {
        EntityType::FilmWork => &FILM_WORK_QUERY,
        EntityType::Genre => &GENRE_QUERY,
        EntityType::Person => &PERSON_QUERY,
    }
}

fn decode_film_work(row: &PgRow) -> Result<SourceRow, sqlx::Error> {
    let genres: Json<Vec<FilmGenreRef>> = row.try_get("genres")?;
    let persons: Json<Vec<FilmPersonRef>> = row.try_get("persons")?;

    Ok(FilmWorkRow {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        rating: row.try_get("rating")?,
        modified: row.try_get("modified")?,
        genres: genres.0,
        persons: persons.0,
    }
    .into())
}

fn decode_genre(row: &PgRow) -> Result<SourceRow, sqlx::Error> {
    Ok(GenreRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        modified: row.try_get("modified")?,
    }
    .into())
}

fn decode_person(row: &PgRow) -> Result<SourceRow, sqlx::Error> {
    let films: Json<Vec<PersonFilmRef>> = row.try_get("films")?;

    Ok(PersonRow {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        modified: row.try_get("modified")?,
        films: films.0,
    }
    .into())
}
