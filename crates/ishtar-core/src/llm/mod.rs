//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation (token hashing for development, HTTP services for production)
//! - Text completion over a local server or a hosted API

mod client;
mod hashing_embedder;
mod http_embedder;
mod traits;

pub use client::{CompletionBackend, CompletionClient};
pub use hashing_embedder::HashingEmbedder;
pub use http_embedder::HttpEmbedder;
pub use traits::*;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::Result;
use std::sync::Arc;

/// Construct the embedder named by configuration
pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),
        EmbeddingProvider::Http => Ok(Arc::new(HttpEmbedder::from_config(config)?)),
    }
}
