//! Vector search benchmarks
//!
//! Measures performance of:
//! - Exact scan over the dense matrix
//! - HNSW search once the graph is built
//! - Query embedding with the hashing embedder

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ishtar_core::{Embedder, HashingEmbedder, IndexOptions, Metadata, VectorBackend, VectorIndex};

const DIMENSIONS: usize = 256;

const HEADLINES: &[&str] = &[
    "Flooding displaces thousands along the river delta",
    "Cholera cases rise in camps after heavy rains",
    "Aid convoy reaches besieged town after weeks of delay",
    "Drought pushes pastoralists toward the border",
    "Earthquake damages hospitals and schools in the north",
    "Food prices spike as harvest fails for second year",
    "Measles vaccination campaign expands to rural districts",
    "Cyclone warning issued for coastal provinces",
];

fn build_index(rows: usize, backend: VectorBackend) -> (VectorIndex, HashingEmbedder) {
    let embedder = HashingEmbedder::new(DIMENSIONS);
    let mut index = VectorIndex::in_memory(IndexOptions {
        dimensions: DIMENSIONS,
        backend,
        ann_threshold: 100,
    });

    let texts: Vec<String> = (0..rows)
        .map(|i| format!("{} (report {})", HEADLINES[i % HEADLINES.len()], i))
        .collect();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let vectors = rt.block_on(embedder.embed_batch(&texts)).unwrap();
    let ids = (0..rows).map(|i| format!("doc-{}", i)).collect();
    let metas = vec![Metadata::new(); rows];
    index.upsert(ids, vectors, metas).unwrap();

    (index, embedder)
}

fn bench_search_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_search");
    let rt = tokio::runtime::Runtime::new().unwrap();

    for rows in [1_000, 5_000] {
        for backend in [VectorBackend::Flat, VectorBackend::Hnsw] {
            let (index, embedder) = build_index(rows, backend);
            let query = rt
                .block_on(embedder.embed("cholera outbreak in camps"))
                .unwrap();

            group.bench_with_input(
                BenchmarkId::new(backend.as_str(), rows),
                &query,
                |b, query| b.iter(|| index.search(black_box(query), black_box(20)).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_query_embedding(c: &mut Criterion) {
    let embedder = HashingEmbedder::new(ishtar_core::DEFAULT_DIMENSIONS);
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("hashing_embed_query", |b| {
        b.iter(|| {
            rt.block_on(embedder.embed(black_box("food insecurity in the sahel region")))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_search_backends, bench_query_embedding);
criterion_main!(benches);
