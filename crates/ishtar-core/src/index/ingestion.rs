//! Batched embed + upsert of normalized documents

use super::document::{normalize, Document, RawItem};
use crate::error::{IshtarError, Result};
use crate::llm::Embedder;
use crate::vectors::VectorIndex;
use serde::Serialize;
use tokio::sync::RwLock;

/// Default number of documents embedded and upserted together
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Ingestion progress, reported after each committed batch
#[derive(Debug, Clone)]
pub struct IngestProgress {
    pub total_documents: usize,
    pub committed_documents: usize,
    pub committed_batches: usize,
}

/// Ingestion statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestStats {
    pub documents: usize,
    pub batches: usize,
}

/// Normalize `items`, then embed and upsert them `batch_size` at a time.
///
/// Each batch is committed at most once. The first failing batch stops
/// ingestion; earlier batches stay committed and the error carries their count.
pub async fn ingest(
    items: Vec<RawItem>,
    embedder: &dyn Embedder,
    index: &RwLock<VectorIndex>,
    batch_size: usize,
    progress: Option<Box<dyn Fn(IngestProgress) + Send + Sync>>,
) -> Result<IngestStats> {
    if batch_size == 0 {
        return Err(IshtarError::validation("batch_size must be > 0"));
    }

    let docs: Vec<Document> = items.into_iter().map(normalize).collect();
    let total = docs.len();
    let mut stats = IngestStats::default();

    for batch in docs.chunks(batch_size) {
        if let Err(e) = ingest_batch(batch, embedder, index).await {
            tracing::warn!(
                "Ingestion stopped after {} batch(es): {}",
                stats.batches,
                e
            );
            return Err(IshtarError::Ingest {
                committed_batches: stats.batches,
                message: e.to_string(),
            });
        }

        stats.batches += 1;
        stats.documents += batch.len();
        tracing::info!(
            "Ingested batch {} ({}/{} documents)",
            stats.batches,
            stats.documents,
            total
        );

        if let Some(ref cb) = progress {
            cb(IngestProgress {
                total_documents: total,
                committed_documents: stats.documents,
                committed_batches: stats.batches,
            });
        }
    }

    Ok(stats)
}

async fn ingest_batch(
    batch: &[Document],
    embedder: &dyn Embedder,
    index: &RwLock<VectorIndex>,
) -> Result<()> {
    let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;

    let ids = batch.iter().map(|d| d.id.clone()).collect();
    let metas = batch.iter().map(Document::index_metadata).collect();

    index.write().await.upsert(ids, vectors, metas)
}
