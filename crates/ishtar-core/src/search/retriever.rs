//! Query-time retrieval over the vector index

use super::compress::{ContextCompressor, PassThrough};
use super::{dedupe, SearchHit};
use crate::error::{IshtarError, Result};
use crate::llm::Embedder;
use crate::vectors::VectorIndex;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default number of hits returned
pub const DEFAULT_RETRIEVE_K: usize = 12;

/// Default number of candidates fetched before dedupe
pub const DEFAULT_RERANK_POOL: usize = 20;

/// Embeds queries and returns deduplicated nearest neighbors.
/// Never writes to the index.
pub struct Retriever {
    index: Arc<RwLock<VectorIndex>>,
    embedder: Arc<dyn Embedder>,
    compressor: Arc<dyn ContextCompressor>,
    k: usize,
    rerank_pool: usize,
}

impl Retriever {
    pub fn new(index: Arc<RwLock<VectorIndex>>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            compressor: Arc::new(PassThrough),
            k: DEFAULT_RETRIEVE_K,
            rerank_pool: DEFAULT_RERANK_POOL,
        }
    }

    pub fn with_compressor(mut self, compressor: Arc<dyn ContextCompressor>) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_rerank_pool(mut self, rerank_pool: usize) -> Self {
        self.rerank_pool = rerank_pool;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn rerank_pool(&self) -> usize {
        self.rerank_pool
    }

    pub fn compressor_name(&self) -> &'static str {
        self.compressor.name()
    }

    /// Top `k` unique hits for `query` (defaults to the configured k)
    pub async fn retrieve(&self, query: &str, k: Option<usize>) -> Result<Vec<SearchHit>> {
        let k = match k {
            Some(0) => return Err(IshtarError::validation("k must be > 0")),
            Some(k) => k,
            None => self.k,
        };
        let pool = self.rerank_pool.max(k);

        let query_vec = self.embedder.embed(query).await?;
        let raw = self.index.read().await.search(&query_vec, pool)?;
        let raw_count = raw.len();

        let mut hits = dedupe(raw);
        hits.truncate(k);
        for (rank, hit) in hits.iter_mut().enumerate() {
            hit.rank = rank;
        }

        tracing::debug!(
            "Retrieved {} hits ({} candidates, pool {}) for query",
            hits.len(),
            raw_count,
            pool
        );
        Ok(hits)
    }

    /// Retrieve, then compress to `budget_tokens`
    pub async fn build_context(
        &self,
        query: &str,
        budget_tokens: usize,
        k: Option<usize>,
    ) -> Result<Vec<SearchHit>> {
        let hits = self.retrieve(query, k).await?;
        Ok(self.compressor.compress(hits, budget_tokens))
    }
}
