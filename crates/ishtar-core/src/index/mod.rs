//! Ingestion pipeline
//!
//! Normalization of raw records into documents with stable ids, and batched
//! embedding + upsert into the vector index.

mod document;
mod ingestion;

pub use document::*;
pub use ingestion::*;
