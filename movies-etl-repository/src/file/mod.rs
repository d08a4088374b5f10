//! File-backed implementations.

mod watermark_store;

pub use watermark_store::JsonFileWatermarkStore;
