//! Persistent vector index
//!
//! Stores `(id, vector, metadata)` rows in insertion order and answers
//! k-nearest-neighbor queries by inner product over L2-normalized vectors.
//! Rows are append-only: `ids[i]`, `metas[i]` and row `i` of the matrix always
//! describe the same document.

mod ann;
pub mod math;
pub mod persist;

use crate::error::{IshtarError, Result};
use ann::AnnGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Document metadata (at minimum `source` and `title`)
pub type Metadata = BTreeMap<String, String>;

/// Nearest-neighbor strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Exact scan over the dense matrix
    Flat,
    /// HNSW graph once the index is large enough, exact scan below that
    Hnsw,
}

impl VectorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Hnsw => "hnsw",
        }
    }
}

impl FromStr for VectorBackend {
    type Err = IshtarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "faiss" | "exact" => Ok(Self::Flat),
            "hnsw" => Ok(Self::Hnsw),
            other => Err(IshtarError::validation(format!(
                "Unsupported backend: {}",
                other
            ))),
        }
    }
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    /// Cosine similarity, descending within a result set
    pub score: f32,
    #[serde(rename = "meta")]
    pub metadata: Metadata,
    /// 0-based position within the result set
    pub rank: usize,
}

/// Index construction options
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub dimensions: usize,
    pub backend: VectorBackend,
    /// Minimum row count before an HNSW graph is built
    pub ann_threshold: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            dimensions: crate::DEFAULT_DIMENSIONS,
            backend: VectorBackend::Flat,
            ann_threshold: 1000,
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub rows: usize,
    pub unique_ids: usize,
    pub dimensions: usize,
    pub backend: VectorBackend,
    pub ann_built: bool,
    pub path: Option<PathBuf>,
}

/// In-memory vector store mirrored to disk after every upsert
pub struct VectorIndex {
    path: Option<PathBuf>,
    options: IndexOptions,
    ids: Vec<String>,
    metas: Vec<Metadata>,
    /// Row-major, `ids.len() * dimensions` values
    vectors: Vec<f32>,
    ann: AnnGraph,
}

impl VectorIndex {
    /// Index that is never persisted
    pub fn in_memory(options: IndexOptions) -> Self {
        Self {
            path: None,
            options,
            ids: Vec::new(),
            metas: Vec::new(),
            vectors: Vec::new(),
            ann: AnnGraph::new(),
        }
    }

    /// Open the index persisted at `path`, or start empty.
    ///
    /// Corrupt or inconsistent artifacts are logged and ignored; the next
    /// upsert overwrites them.
    pub fn open(path: impl AsRef<Path>, options: IndexOptions) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut index = Self::in_memory(options);

        match persist::load(&path, index.options.dimensions) {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    "Loaded vector index from {} ({} rows)",
                    path.display(),
                    snapshot.ids.len()
                );
                index.ids = snapshot.ids;
                index.metas = snapshot.metas;
                index.vectors = snapshot.vectors;
            }
            Ok(None) => {
                tracing::info!(
                    "No vector index at {}; it will be created on first upsert",
                    path.display()
                );
            }
            Err(e) => {
                tracing::error!("Ignoring unreadable vector index, starting empty: {}", e);
            }
        }

        index.path = Some(path);
        index
    }

    /// Append rows, then persist every artifact.
    ///
    /// Ids already present are not overwritten; the new row is appended
    /// after the old one. If persisting fails the rows stay in memory and the
    /// error is returned.
    pub fn upsert(
        &mut self,
        ids: Vec<String>,
        vectors: Vec<Vec<f32>>,
        metadatas: Vec<Metadata>,
    ) -> Result<()> {
        if ids.len() != vectors.len() || ids.len() != metadatas.len() {
            return Err(IshtarError::validation(format!(
                "upsert length mismatch: {} ids, {} vectors, {} metadatas",
                ids.len(),
                vectors.len(),
                metadatas.len()
            )));
        }
        let dimensions = self.options.dimensions;
        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dimensions) {
            return Err(IshtarError::validation(format!(
                "vector {} ('{}') has dimension {}, index expects {}",
                i,
                ids[i],
                v.len(),
                dimensions
            )));
        }
        if ids.is_empty() {
            return Ok(());
        }

        self.vectors.reserve(vectors.len() * dimensions);
        for mut v in vectors {
            math::normalize_in_place(&mut v);
            self.vectors.extend_from_slice(&v);
        }
        self.ids.extend(ids);
        self.metas.extend(metadatas);

        // Stale graph; the next search rebuilds it once
        self.ann.clear();
        self.persist()
    }

    /// Top-k rows by descending similarity to `query`.
    ///
    /// Ties keep insertion order. `k` larger than the index returns every row.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(IshtarError::validation("k must be > 0"));
        }
        if query.len() != self.options.dimensions {
            return Err(IshtarError::validation(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.options.dimensions
            )));
        }
        if self.ids.is_empty() {
            return Ok(Vec::new());
        }

        let q = math::normalize(query);
        self.ensure_ann();
        // Graph results are capped by its search breadth; fall back when short
        let wanted = k.min(self.ids.len());
        let mut scored = match self.ann.search(&q, k) {
            Some(approx) if approx.len() >= wanted => approx,
            _ => self.exact_scores(&q),
        };
        scored.sort_by(|(pa, sa), (pb, sb)| {
            sb.partial_cmp(sa).unwrap_or(Ordering::Equal).then(pa.cmp(pb))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(rank, (pos, score))| SearchHit {
                id: self.ids[pos].clone(),
                score,
                metadata: self.metas[pos].clone(),
                rank,
            })
            .collect())
    }

    fn exact_scores(&self, q: &[f32]) -> Vec<(usize, f32)> {
        self.vectors
            .chunks_exact(self.options.dimensions)
            .map(|row| math::dot(row, q))
            .enumerate()
            .collect()
    }

    /// Build the HNSW graph if the backend wants one and it is missing or stale
    fn ensure_ann(&self) {
        if self.options.backend != VectorBackend::Hnsw
            || self.ids.len() < self.options.ann_threshold
        {
            return;
        }
        if self.ann.built_rows() != Some(self.ids.len()) {
            self.ann.rebuild(&self.vectors, self.options.dimensions);
        }
    }

    fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => persist::save(
                path,
                self.options.backend,
                self.options.dimensions,
                &self.ids,
                &self.metas,
                &self.vectors,
            ),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.options.dimensions
    }

    pub fn backend(&self) -> VectorBackend {
        self.options.backend
    }

    /// Ids in row order (duplicates included)
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Metadata of the row at `position`
    pub fn metadata(&self, position: usize) -> Option<&Metadata> {
        self.metas.get(position)
    }

    /// Normalized vector of the row at `position`
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let d = self.options.dimensions;
        self.vectors.get(position * d..(position + 1) * d)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn stats(&self) -> IndexStats {
        let unique: std::collections::HashSet<&str> =
            self.ids.iter().map(|s| s.as_str()).collect();
        IndexStats {
            rows: self.ids.len(),
            unique_ids: unique.len(),
            dimensions: self.options.dimensions,
            backend: self.options.backend,
            ann_built: self.ann.is_built(),
            path: self.path.clone(),
        }
    }
}
