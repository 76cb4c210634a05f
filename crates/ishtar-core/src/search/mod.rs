//! Retrieval
//!
//! Provides:
//! - Query embedding + nearest-neighbor search with id dedupe
//! - Pluggable context compression
//! - Optional real-time web search

mod compress;
mod retriever;
mod web;

pub use crate::vectors::SearchHit;
pub use compress::*;
pub use retriever::*;
pub use web::*;

use std::collections::HashSet;

/// Keep the first occurrence of each id, preserving order
pub fn dedupe(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.id.clone()))
        .collect()
}
