use thiserror::Error;

/// Errors raised by a watermark store.
///
/// Any of these is fatal to the current entity run; the next cycle starts
/// again from whatever value was last persisted.
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
