//! HNSW approximate nearest neighbor graph over index rows

use super::math::dot;
use instant_distance::{Builder, HnswMap, Search};
use std::sync::RwLock;

/// Wrapper for normalized f32 rows implementing instant_distance::Point
#[derive(Clone)]
struct RowPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for RowPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Rows are unit length, so cosine distance reduces to 1 - dot
        1.0 - dot(&self.values, &other.values)
    }
}

struct BuiltGraph {
    map: HnswMap<RowPoint, usize>,
    rows: usize,
}

/// HNSW graph mapping points back to their positional row index
pub struct AnnGraph {
    graph: RwLock<Option<BuiltGraph>>,
}

impl AnnGraph {
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(None),
        }
    }

    /// Rebuild the graph from row-major normalized vectors.
    pub fn rebuild(&self, vectors: &[f32], dimensions: usize) {
        let points: Vec<RowPoint> = vectors
            .chunks_exact(dimensions)
            .map(|row| RowPoint {
                values: row.to_vec(),
            })
            .collect();
        let positions: Vec<usize> = (0..points.len()).collect();
        let count = points.len();

        let map = Builder::default().build(points, positions);
        match self.graph.write() {
            Ok(mut guard) => {
                *guard = Some(BuiltGraph { map, rows: count });
                tracing::info!("Built ANN graph over {} rows", count);
            }
            Err(e) => tracing::warn!("ANN graph lock poisoned, graph not rebuilt: {}", e),
        }
    }

    /// Drop the graph so searches fall back to the exact scan
    pub fn clear(&self) {
        if let Ok(mut guard) = self.graph.write() {
            *guard = None;
        }
    }

    /// Search for approximately the k nearest rows.
    /// Returns (position, cosine_similarity) pairs, or None when no graph is built.
    pub fn search(&self, query: &[f32], k: usize) -> Option<Vec<(usize, f32)>> {
        let guard = self.graph.read().ok()?;
        let map = &guard.as_ref()?.map;

        let point = RowPoint {
            values: query.to_vec(),
        };
        let mut search = Search::default();

        Some(
            map.search(&point, &mut search)
                .take(k)
                .map(|item| (*item.value, 1.0 - item.distance))
                .collect(),
        )
    }

    /// Whether the HNSW graph has been built
    pub fn is_built(&self) -> bool {
        self.built_rows().is_some()
    }

    /// Row count the current graph was built over
    pub fn built_rows(&self) -> Option<usize> {
        self.graph
            .read()
            .ok()
            .and_then(|g| g.as_ref().map(|built| built.rows))
    }
}

impl Default for AnnGraph {
    fn default() -> Self {
        Self::new()
    }
}
