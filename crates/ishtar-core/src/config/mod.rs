//! Configuration management

use crate::error::{IshtarError, Result};
use crate::vectors::VectorBackend;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment label reported by the health check
    #[serde(default = "default_env")]
    pub env: String,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// LLM service configuration
    #[serde(default)]
    pub llm: LLMServiceConfig,

    /// Live web search (disabled when no API key is set)
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: default_env(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LLMServiceConfig::default(),
            web_search: WebSearchConfig::default(),
        }
    }
}

/// Which embedder implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic token-hashing embedder (no network)
    #[default]
    Hashing,
    /// OpenAI-compatible `/v1/embeddings` service
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Base URL of the embedding service (http provider only)
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            dimensions: default_dimensions(),
            url: None,
            model: default_embedding_model(),
            api_key: None,
            timeout_secs: default_service_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector backend name: `flat` (alias `faiss`) or `hnsw`
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Base path of the persisted index artifacts
    #[serde(default = "default_index_path")]
    pub path: PathBuf,

    /// Minimum row count before the hnsw backend builds its graph
    #[serde(default = "default_ann_threshold")]
    pub ann_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_index_path(),
            ann_threshold: default_ann_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Hits returned by default
    #[serde(default = "default_retrieve_k")]
    pub k: usize,

    /// Candidates fetched before dedupe/truncation
    #[serde(default = "default_rerank_pool")]
    pub rerank_pool: usize,

    /// Token allowance for the generation context
    #[serde(default = "default_context_tokens")]
    pub max_context_tokens: usize,

    /// Enforce `max_context_tokens` instead of passing hits through
    #[serde(default)]
    pub enforce_budget: bool,

    /// Documents per embed+upsert batch during ingestion
    #[serde(default = "default_batch_size")]
    pub ingest_batch_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_retrieve_k(),
            rerank_pool: default_rerank_pool(),
            max_context_tokens: default_context_tokens(),
            enforce_budget: false,
            ingest_batch_size: default_batch_size(),
        }
    }
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Locally hosted completion-compatible server (vLLM/TGI); preferred when set
    #[serde(default)]
    pub local_url: Option<String>,

    /// Model name sent to the local server, if it requires one
    #[serde(default)]
    pub local_model: Option<String>,

    /// Hosted provider base URL
    #[serde(default = "default_hosted_url")]
    pub hosted_url: String,

    /// Hosted provider model
    #[serde(default = "default_hosted_model")]
    pub hosted_model: String,

    /// Hosted provider API key; without it the hosted backend is unavailable
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            local_url: None,
            local_model: None,
            hosted_url: default_hosted_url(),
            hosted_model: default_hosted_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_web_search_url")]
    pub url: String,

    #[serde(default = "default_web_results")]
    pub max_results: usize,

    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: default_web_search_url(),
            max_results: default_web_results(),
            timeout_secs: default_service_timeout(),
        }
    }
}

fn default_env() -> String {
    "dev".to_string()
}

fn default_dimensions() -> usize {
    1536
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_backend() -> String {
    "flat".to_string()
}

fn default_index_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("data"))
        .join(crate::DATA_DIR_NAME)
        .join("articles.index")
}

fn default_ann_threshold() -> usize {
    1000
}

fn default_retrieve_k() -> usize {
    12
}

fn default_rerank_pool() -> usize {
    20
}

fn default_context_tokens() -> usize {
    4000
}

fn default_batch_size() -> usize {
    64
}

fn default_hosted_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_hosted_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.2
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_service_timeout() -> u64 {
    30
}

fn default_web_search_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_web_results() -> usize {
    4
}

impl Config {
    /// Load config from `ISHTAR_CONFIG` or the default path, then apply env overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var("ISHTAR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file; a missing file yields defaults
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Overlay environment variables on top of file values.
    ///
    /// The lookup is injected so tests can exercise overrides without
    /// touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("ISHTAR_ENV") {
            self.env = v;
        }
        if let Some(v) = non_empty("ISHTAR_INDEX_PATH") {
            self.index.path = PathBuf::from(v);
        }
        if let Some(v) = non_empty("ISHTAR_VECTOR_BACKEND") {
            self.index.backend = v;
        }
        if let Some(v) = non_empty("ISHTAR_EMBEDDING_URL") {
            self.embedding.url = Some(v);
            self.embedding.provider = EmbeddingProvider::Http;
        }
        if let Some(v) = non_empty("ISHTAR_EMBEDDING_DIMS").and_then(|s| s.parse().ok()) {
            self.embedding.dimensions = v;
        }
        if let Some(v) = non_empty("ISHTAR_RETRIEVE_K").and_then(|s| s.parse().ok()) {
            self.retrieval.k = v;
        }
        if let Some(v) = non_empty("ISHTAR_RERANK_POOL").and_then(|s| s.parse().ok()) {
            self.retrieval.rerank_pool = v;
        }
        if let Some(v) = non_empty("ISHTAR_MAX_CONTEXT_TOKENS").and_then(|s| s.parse().ok()) {
            self.retrieval.max_context_tokens = v;
        }
        if let Some(v) = non_empty("ISHTAR_LLM_URL").or_else(|| non_empty("VLLM_BASE_URL")) {
            self.llm.local_url = Some(v);
        }
        if let Some(v) = non_empty("ISHTAR_LLM_MODEL") {
            self.llm.hosted_model = v;
        }
        if let Some(v) = non_empty("OPENAI_API_KEY") {
            if self.embedding.api_key.is_none() {
                self.embedding.api_key = Some(v.clone());
            }
            self.llm.api_key = Some(v);
        }
        if let Some(v) = non_empty("TAVILY_API_KEY") {
            self.web_search.api_key = Some(v);
        }
    }

    /// Reject values the core cannot run with
    pub fn validate(&self) -> Result<()> {
        self.vector_backend()?;
        if self.embedding.dimensions == 0 {
            return Err(IshtarError::validation("embedding.dimensions must be > 0"));
        }
        if self.retrieval.k == 0 {
            return Err(IshtarError::validation("retrieval.k must be > 0"));
        }
        if self.retrieval.rerank_pool == 0 {
            return Err(IshtarError::validation("retrieval.rerank_pool must be > 0"));
        }
        if self.retrieval.ingest_batch_size == 0 {
            return Err(IshtarError::validation(
                "retrieval.ingest_batch_size must be > 0",
            ));
        }
        if self.embedding.provider == EmbeddingProvider::Http && self.embedding.url.is_none() {
            return Err(IshtarError::Config(
                "embedding.provider is 'http' but embedding.url is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed vector backend
    pub fn vector_backend(&self) -> Result<VectorBackend> {
        self.index.backend.parse()
    }
}
