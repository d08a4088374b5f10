//! Configuration module for the movies ETL.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{DatabaseSettings, Settings, StateBackend};
