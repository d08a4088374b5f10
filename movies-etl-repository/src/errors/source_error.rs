use thiserror::Error;

/// Errors raised while reading rows from the relational source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not acquire a connection to the source database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The query failed or a row could not be decoded.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SourceError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}
