//! Deterministic token-hashing embedder
//!
//! A development stand-in for a real embedding model: every token is mapped
//! to a stable 64-bit identifier and counted into a fixed number of buckets.
//! Texts sharing vocabulary land close together, which is enough for local
//! runs and tests. Swap in [`super::HttpEmbedder`] for production quality.

use super::Embedder;
use crate::error::Result;
use crate::vectors::math::normalize_in_place;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

/// Tokens beyond this count are ignored
pub const MAX_TOKENS: usize = 2048;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"\w+|[^\w\s]").unwrap();
}

/// Embedder that hashes tokens into buckets
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Synchronous core shared by both trait methods
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        let dim = self.dimensions as u64;
        for (position, id) in token_ids(text).take(MAX_TOKENS).enumerate() {
            let bucket = id.wrapping_add(position as u64) % dim;
            vec[bucket as usize] += 1.0;
        }
        normalize_in_place(&mut vec);
        vec
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(crate::DEFAULT_DIMENSIONS)
    }
}

/// Stable identifier of every token in `text`
fn token_ids(text: &str) -> impl Iterator<Item = u64> + '_ {
    TOKEN_RE.find_iter(text).map(|m| {
        let lowered = m.as_str().to_lowercase();
        let hash = blake3::hash(lowered.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    })
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "hashing"
    }
}
