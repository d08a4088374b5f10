//! Integration tests for the PostgreSQL watermark store.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `DATABASE_URL=... cargo test --test postgres_watermark -- --ignored`

use chrono::{TimeZone, Utc};
use movies_etl_repository::{initial_watermark, PostgresWatermarkStore, WatermarkStore};
use movies_etl_shared::EntityType;

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_absent_watermark_is_initial(pool: sqlx::PgPool) {
    let store = PostgresWatermarkStore::new(pool);

    let watermark = store.get_last_state(EntityType::FilmWork).await.unwrap();
    assert_eq!(watermark, initial_watermark());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_set_and_get_watermark(pool: sqlx::PgPool) {
    let store = PostgresWatermarkStore::new(pool.clone());
    let modified = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    store.set_last_state(EntityType::Genre, modified).await.unwrap();

    assert_eq!(store.get_last_state(EntityType::Genre).await.unwrap(), modified);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM etl_state")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_watermark_never_moves_backwards(pool: sqlx::PgPool) {
    let store = PostgresWatermarkStore::new(pool);
    let newer = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    store.set_last_state(EntityType::Person, newer).await.unwrap();
    store.set_last_state(EntityType::Person, older).await.unwrap();

    assert_eq!(store.get_last_state(EntityType::Person).await.unwrap(), newer);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_entities_are_independent(pool: sqlx::PgPool) {
    let store = PostgresWatermarkStore::new(pool);
    let modified = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    store.set_last_state(EntityType::FilmWork, modified).await.unwrap();

    assert_eq!(
        store.get_last_state(EntityType::Genre).await.unwrap(),
        initial_watermark()
    );
}
