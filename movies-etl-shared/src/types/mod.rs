//! Core data structures used across the movies ETL.
//!
//! Rows flow in from the relational source as [`SourceRow`](source_row::SourceRow)
//! values and leave towards the index as [`SearchDocument`](document::SearchDocument)s.

pub mod document;
pub mod entity_type;
pub mod source_row;
