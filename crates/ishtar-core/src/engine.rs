//! Engine context: every collaborator built once from configuration

use crate::agent::{AgentState, AnswerPipeline, Stage};
use crate::config::Config;
use crate::error::{IshtarError, Result};
use crate::index::{ingest, IngestProgress, IngestStats, RawItem};
use crate::llm::{embedder_from_config, CompletionClient, Embedder, LlmGateway};
use crate::providers::{fetch_all, SourceProvider};
use crate::search::{
    dedupe, ContextCompressor, PassThrough, Retriever, SearchHit, TavilySearch, TokenBudget,
    WebSearch,
};
use crate::vectors::{IndexOptions, IndexStats, Metadata, VectorIndex};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Answer returned when no LLM backend is configured
pub const UNCONFIGURED_ANSWER: &str = "[unconfigured] I'm sorry, no language model backend is configured, so I cannot answer yet. Set ISHTAR_LLM_URL or OPENAI_API_KEY and try again.";

/// Query endpoint request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub k: Option<usize>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: None,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }
}

/// Source a context hit is cited as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub source: String,
    pub score: f32,
    /// `source` and `title` only, empty values omitted
    pub metadata: Option<Metadata>,
}

impl Citation {
    fn from_hit(hit: &SearchHit) -> Self {
        let safe: Metadata = ["source", "title"]
            .iter()
            .filter_map(|key| {
                hit.metadata
                    .get(*key)
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v.clone()))
            })
            .collect();

        Self {
            id: hit.id.clone(),
            source: safe.get("source").cloned().unwrap_or_default(),
            score: hit.score,
            metadata: if safe.is_empty() { None } else { Some(safe) },
        }
    }
}

/// Query endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Liveness report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub env: String,
}

impl Health {
    pub fn for_env(env: impl Into<String>) -> Self {
        Self {
            ok: true,
            env: env.into(),
        }
    }
}

/// Engine status
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub env: String,
    pub index: IndexStats,
    pub embedder: String,
    pub llm_backend: Option<String>,
    pub web_search: Option<String>,
    pub compressor: String,
}

pub struct Engine {
    config: Config,
    index: Arc<RwLock<VectorIndex>>,
    embedder: Arc<dyn Embedder>,
    retriever: Retriever,
    pipeline: Option<AnswerPipeline>,
    web_search: Option<Arc<dyn WebSearch>>,
}

impl Engine {
    /// Build every collaborator named by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let embedder = embedder_from_config(&config.embedding)?;
        let options = IndexOptions {
            dimensions: config.embedding.dimensions,
            backend: config.vector_backend()?,
            ann_threshold: config.index.ann_threshold,
        };
        let index = VectorIndex::open(&config.index.path, options);

        let gateway = CompletionClient::from_config(&config.llm)?
            .map(|client| Arc::new(client) as Arc<dyn LlmGateway>);
        if gateway.is_none() {
            tracing::warn!("No LLM backend configured; answers will be placeholders");
        }

        let web_search = TavilySearch::from_config(&config.web_search)?
            .map(|search| Arc::new(search) as Arc<dyn WebSearch>);

        Ok(Self::new(config.clone(), index, embedder, gateway, web_search))
    }

    /// Assemble an engine from already-built parts
    pub fn new(
        config: Config,
        index: VectorIndex,
        embedder: Arc<dyn Embedder>,
        gateway: Option<Arc<dyn LlmGateway>>,
        web_search: Option<Arc<dyn WebSearch>>,
    ) -> Self {
        let index = Arc::new(RwLock::new(index));
        let compressor: Arc<dyn ContextCompressor> = if config.retrieval.enforce_budget {
            Arc::new(TokenBudget)
        } else {
            Arc::new(PassThrough)
        };
        let retriever = Retriever::new(Arc::clone(&index), Arc::clone(&embedder))
            .with_k(config.retrieval.k)
            .with_rerank_pool(config.retrieval.rerank_pool)
            .with_compressor(compressor);
        let pipeline = gateway.map(|gateway| {
            AnswerPipeline::new(gateway)
                .with_generation(config.llm.max_tokens, config.llm.temperature)
        });

        Self {
            config,
            index,
            embedder,
            retriever,
            pipeline,
            web_search,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &Arc<RwLock<VectorIndex>> {
        &self.index
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Normalize, embed and upsert `items` (batch size defaults to configuration)
    pub async fn ingest(
        &self,
        items: Vec<RawItem>,
        batch_size: Option<usize>,
        progress: Option<Box<dyn Fn(IngestProgress) + Send + Sync>>,
    ) -> Result<IngestStats> {
        let batch_size = batch_size.unwrap_or(self.config.retrieval.ingest_batch_size);
        ingest(items, self.embedder.as_ref(), &self.index, batch_size, progress).await
    }

    /// Fetch every source concurrently, then ingest what arrived
    pub async fn ingest_sources(
        &self,
        sources: &[Arc<dyn SourceProvider>],
        batch_size: Option<usize>,
        progress: Option<Box<dyn Fn(IngestProgress) + Send + Sync>>,
    ) -> Result<IngestStats> {
        let items = fetch_all(sources).await;
        tracing::info!(
            "Fetched {} records from {} source(s)",
            items.len(),
            sources.len()
        );
        self.ingest(items, batch_size, progress).await
    }

    pub async fn search(&self, query: &str, k: Option<usize>) -> Result<Vec<SearchHit>> {
        self.retriever.retrieve(query, k).await
    }

    /// Retrieve context, run the answer pipeline, and cite the context
    pub async fn answer(&self, request: QueryRequest) -> Result<QueryResponse> {
        if request.query.trim().is_empty() {
            return Err(IshtarError::validation("query must not be empty"));
        }
        let k = match request.k {
            Some(0) => return Err(IshtarError::validation("k must be > 0")),
            Some(k) => k,
            None => self.retriever.k(),
        };

        let (context, web_hits) = tokio::join!(
            self.retriever.build_context(
                &request.query,
                self.config.retrieval.max_context_tokens,
                request.k
            ),
            self.web_hits(&request.query, k)
        );
        let context = merge_hits(context?, web_hits, k);
        let citations = citations(&context);

        let Some(pipeline) = &self.pipeline else {
            return Ok(QueryResponse {
                answer: UNCONFIGURED_ANSWER.to_string(),
                citations,
            });
        };

        let run = pipeline
            .run(AgentState::new(request.query.clone(), context))
            .await;
        if let Some(failure) = run.failure {
            if failure.stage == Stage::Summarize {
                return Err(failure.into_error());
            }
            tracing::warn!(
                "Answering with the draft after {} failed: {}",
                failure.stage,
                failure.error
            );
        }

        Ok(QueryResponse {
            answer: run.state.best_answer().unwrap_or_default().to_string(),
            citations,
        })
    }

    pub fn health(&self) -> Health {
        Health::for_env(self.config.env.clone())
    }

    pub async fn status(&self) -> EngineStatus {
        EngineStatus {
            env: self.config.env.clone(),
            index: self.index.read().await.stats(),
            embedder: self.embedder.model_name().to_string(),
            llm_backend: self
                .pipeline
                .as_ref()
                .map(|p| p.backend_name().to_string()),
            web_search: self.web_search.as_ref().map(|w| w.name().to_string()),
            compressor: self.retriever.compressor_name().to_string(),
        }
    }

    async fn web_hits(&self, query: &str, k: usize) -> Vec<SearchHit> {
        let Some(web) = &self.web_search else {
            return Vec::new();
        };
        let max_results = self.config.web_search.max_results.min(k).max(1);
        match web.search(query, max_results).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Web search via {} failed: {}", web.name(), e);
                Vec::new()
            }
        }
    }
}

/// Merge web hits into the context: dedupe by id, order by descending score,
/// keep `k`. Without web hits the context is returned unchanged.
///
/// Web hits carry the search provider's relevance score, index hits a cosine
/// similarity. The two scales are not calibrated; scores are compared as-is.
fn merge_hits(context: Vec<SearchHit>, web_hits: Vec<SearchHit>, k: usize) -> Vec<SearchHit> {
    if web_hits.is_empty() {
        return context;
    }

    let mut merged = dedupe(context.into_iter().chain(web_hits).collect());
    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    merged.truncate(k);
    for (rank, hit) in merged.iter_mut().enumerate() {
        hit.rank = rank;
    }
    merged
}

fn citations(context: &[SearchHit]) -> Vec<Citation> {
    let mut sorted: Vec<&SearchHit> = context.iter().collect();
    sorted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    sorted.into_iter().map(Citation::from_hit).collect()
}
