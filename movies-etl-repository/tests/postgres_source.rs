//! Integration tests for the PostgreSQL source repository.
//!
//! The `content` fixture creates the source schema with a handful of rows.
//!
//! Run with: `DATABASE_URL=... cargo test --test postgres_source -- --ignored`

use chrono::{TimeZone, Utc};
use movies_etl_repository::{initial_watermark, PostgresSourceRepository, SourceRepository};
use movies_etl_shared::{EntityType, SourceRow};

#[sqlx::test(fixtures("content"))]
#[ignore = "requires a PostgreSQL database"]
async fn test_genres_are_returned_in_modified_order(pool: sqlx::PgPool) {
    let source = PostgresSourceRepository::new(pool);

    let rows = source
        .fetch_changed(EntityType::Genre, initial_watermark(), 10)
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|w| w[0].modified() <= w[1].modified()));
    assert!(rows.iter().all(|row| row.entity_type() == EntityType::Genre));
}

#[sqlx::test(fixtures("content"))]
#[ignore = "requires a PostgreSQL database"]
async fn test_since_is_exclusive_and_limit_applies(pool: sqlx::PgPool) {
    let source = PostgresSourceRepository::new(pool);
    let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let rows = source.fetch_changed(EntityType::Genre, since, 1).await.unwrap();

    assert_eq!(rows.len(), 1);
    match &rows[0] {
        SourceRow::Genre(genre) => assert_eq!(genre.name.as_deref(), Some("Sci-Fi")),
        other => panic!("unexpected row {other:?}"),
    }
}

#[sqlx::test(fixtures("content"))]
#[ignore = "requires a PostgreSQL database"]
async fn test_film_work_rows_carry_genres_and_persons(pool: sqlx::PgPool) {
    let source = PostgresSourceRepository::new(pool);

    let rows = source
        .fetch_changed(EntityType::FilmWork, initial_watermark(), 10)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let SourceRow::FilmWork(star_wars) = &rows[0] else {
        panic!("expected a film work row");
    };
    assert_eq!(star_wars.title.as_deref(), Some("Star Wars"));
    assert_eq!(star_wars.genres.len(), 2);
    assert_eq!(star_wars.persons.len(), 3);

    let SourceRow::FilmWork(lonely) = &rows[1] else {
        panic!("expected a film work row");
    };
    assert!(lonely.genres.is_empty());
    assert!(lonely.persons.is_empty());
    assert!(lonely.rating.is_none());
}

#[sqlx::test(fixtures("content"))]
#[ignore = "requires a PostgreSQL database"]
async fn test_person_rows_carry_films_with_roles(pool: sqlx::PgPool) {
    let source = PostgresSourceRepository::new(pool);

    let rows = source
        .fetch_changed(EntityType::Person, initial_watermark(), 10)
        .await
        .unwrap();

    let SourceRow::Person(lucas) = &rows[0] else {
        panic!("expected a person row");
    };
    assert_eq!(lucas.full_name.as_deref(), Some("George Lucas"));
    assert_eq!(lucas.films.len(), 1);
    assert_eq!(lucas.films[0].roles, vec!["director", "writer"]);
}

#[sqlx::test(fixtures("content"))]
#[ignore = "requires a PostgreSQL database"]
async fn test_caught_up_source_returns_no_rows(pool: sqlx::PgPool) {
    let source = PostgresSourceRepository::new(pool);
    let since = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

    let rows = source.fetch_changed(EntityType::Person, since, 10).await.unwrap();
    assert!(rows.is_empty());
}
