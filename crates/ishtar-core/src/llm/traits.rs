//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
///
/// Implementations must be deterministic for a given text and must surface
/// backend failures as errors rather than returning placeholder vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Single request/response text generation
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Complete `prompt`, returning the generated text
    async fn call(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;

    /// Short label of the active backend (for logs and status)
    fn backend_name(&self) -> &str;
}
