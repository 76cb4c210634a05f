//! Ishtar Core Library
//!
//! Retrieval-augmented question answering over humanitarian news and reports.
//!
//! # Features
//! - Persistent vector index with exact or HNSW inner-product search
//! - Deduplicating retriever with pluggable context compression
//! - Batched ingestion with stable document ids
//! - Linear summarize → verify → refine answer pipeline
//! - Local (vLLM/TGI) or hosted completion backends, chosen from configuration
//! - Optional real-time web search merged into the context

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
mod http;
pub mod index;
pub mod llm;
pub mod providers;
pub mod search;
pub mod vectors;

pub use agent::{AgentState, AnswerPipeline, PipelineRun, Stage, StageFailure};
pub use config::{Config, EmbeddingConfig, LLMServiceConfig, RetrievalConfig};
pub use engine::{
    Citation, Engine, EngineStatus, Health, QueryRequest, QueryResponse, UNCONFIGURED_ANSWER,
};
pub use error::{Error, IshtarError, Result};
pub use index::{ingest, normalize, Document, IngestStats, RawItem};
pub use llm::{
    CompletionBackend, CompletionClient, Embedder, HashingEmbedder, HttpEmbedder, LlmGateway,
};
pub use providers::{fetch_all, HttpJsonSource, JsonFileSource, SourceProvider};
pub use search::{
    dedupe, ContextCompressor, PassThrough, Retriever, TavilySearch, TokenBudget, WebSearch,
};
pub use vectors::{IndexOptions, IndexStats, Metadata, SearchHit, VectorBackend, VectorIndex};

/// Default embedding dimensionality
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Default data directory name (index artifacts)
pub const DATA_DIR_NAME: &str = "ishtar";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "ishtar";
