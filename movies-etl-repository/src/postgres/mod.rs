//! PostgreSQL implementations of the source repository and watermark store.

pub mod queries;
mod source_repository;
mod watermark_store;

pub use queries::{query_template, QueryTemplate};
pub use source_repository::PostgresSourceRepository;
pub use watermark_store::PostgresWatermarkStore;
