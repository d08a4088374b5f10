//! Error types for the movies ETL repository.
//!
//! One error type per storage seam: the relational source, the watermark
//! store and the search index.

mod search_index_error;
mod source_error;
mod watermark_error;

pub use search_index_error::SearchIndexError;
pub use source_error::SourceError;
pub use watermark_error::WatermarkError;
