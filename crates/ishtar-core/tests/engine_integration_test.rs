//! Engine-level tests: ingest, answer and citations with stub collaborators

use async_trait::async_trait;
use ishtar_core::index::IngestProgress;
use ishtar_core::{
    Config, Engine, HashingEmbedder, IndexOptions, IshtarError, JsonFileSource, LlmGateway,
    Metadata, QueryRequest, RawItem, Result, SearchHit, SourceProvider, VectorIndex, WebSearch,
    UNCONFIGURED_ANSWER,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const DIMS: usize = 64;

/// Answers with the stage header it was prompted with, numbered by call
struct StageEcho {
    calls: AtomicUsize,
    fail_on: Option<usize>,
}

impl StageEcho {
    fn new(fail_on: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_on,
        })
    }
}

#[async_trait]
impl LlmGateway for StageEcho {
    async fn call(&self, prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(n) {
            return Err(IshtarError::Backend("connection reset".to_string()));
        }
        let header = prompt.lines().next().unwrap_or_default();
        Ok(format!("{}: {}", n, header))
    }

    fn backend_name(&self) -> &str {
        "stage-echo"
    }
}

struct FixedWeb(Vec<SearchHit>);

#[async_trait]
impl WebSearch for FixedWeb {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        Ok(self.0.iter().take(max_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct BrokenWeb;

#[async_trait]
impl WebSearch for BrokenWeb {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
        Err(IshtarError::Backend("web search timed out".to_string()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.env = "test".to_string();
    config.embedding.dimensions = DIMS;
    config
}

fn engine(gateway: Option<Arc<dyn LlmGateway>>, web: Option<Arc<dyn WebSearch>>) -> Engine {
    let index = VectorIndex::in_memory(IndexOptions {
        dimensions: DIMS,
        ..Default::default()
    });
    Engine::new(
        config(),
        index,
        Arc::new(HashingEmbedder::new(DIMS)),
        gateway,
        web,
    )
}

fn items() -> Vec<RawItem> {
    serde_json::from_str(
        r#"[
            {"title":"Floods in the delta","summary":"12,000 displaced","link":"https://example.org/floods"},
            {"title":"Cholera response","summary":"Three treatment centres opened"},
            {"title":"Market prices","summary":"Staple prices rose"}
        ]"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_answer_runs_all_stages() {
    let gateway = StageEcho::new(None);
    let engine = engine(Some(gateway.clone()), None);
    engine.ingest(items(), Some(2), None).await.unwrap();

    let response = engine
        .answer(QueryRequest::new("floods displaced").with_k(2))
        .await
        .unwrap();

    assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
    assert!(response.answer.starts_with("2: Refine the draft"));
    assert_eq!(response.citations.len(), 2);
    assert!(response.citations[0].score >= response.citations[1].score);
    for citation in &response.citations {
        let metadata = citation.metadata.as_ref().unwrap();
        assert!(!metadata.contains_key("text"));
    }
}

#[tokio::test]
async fn test_verify_failure_answers_with_draft() {
    let engine = engine(Some(StageEcho::new(Some(1))), None);
    engine.ingest(items(), None, None).await.unwrap();

    let response = engine.answer(QueryRequest::new("cholera")).await.unwrap();
    assert!(response.answer.starts_with("0: You are Ishtar AI"));
}

#[tokio::test]
async fn test_summarize_failure_propagates() {
    let engine = engine(Some(StageEcho::new(Some(0))), None);
    engine.ingest(items(), None, None).await.unwrap();

    let err = engine.answer(QueryRequest::new("cholera")).await.unwrap_err();
    assert!(matches!(err, IshtarError::Stage { stage: "summarize", .. }));
}

#[tokio::test]
async fn test_unconfigured_gateway_apologizes() {
    let engine = engine(None, None);
    engine.ingest(items(), None, None).await.unwrap();

    let response = engine.answer(QueryRequest::new("prices")).await.unwrap();
    assert_eq!(response.answer, UNCONFIGURED_ANSWER);
    assert_eq!(response.citations.len(), 3);
}

#[tokio::test]
async fn test_empty_index_still_answers() {
    let engine = engine(Some(StageEcho::new(None)), None);
    let response = engine.answer(QueryRequest::new("anything")).await.unwrap();
    assert!(response.citations.is_empty());
    assert!(!response.answer.is_empty());
}

#[tokio::test]
async fn test_invalid_requests() {
    let engine = engine(None, None);
    assert!(matches!(
        engine.answer(QueryRequest::new("q").with_k(0)).await,
        Err(IshtarError::Validation(_))
    ));
    assert!(matches!(
        engine.answer(QueryRequest::new("   ")).await,
        Err(IshtarError::Validation(_))
    ));
}

#[tokio::test]
async fn test_web_hits_merged_by_score() {
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), "https://news.example/live".to_string());
    metadata.insert("title".to_string(), "Live updates".to_string());
    metadata.insert("text".to_string(), "Water levels falling".to_string());
    let web_hit = SearchHit {
        id: "https://news.example/live".to_string(),
        score: 5.0,
        metadata,
        rank: 0,
    };

    let engine = engine(None, Some(Arc::new(FixedWeb(vec![web_hit]))));
    engine.ingest(items(), None, None).await.unwrap();

    let response = engine
        .answer(QueryRequest::new("floods").with_k(2))
        .await
        .unwrap();
    assert_eq!(response.citations.len(), 2);
    assert_eq!(response.citations[0].id, "https://news.example/live");
    assert_eq!(response.citations[0].source, "https://news.example/live");
}

#[tokio::test]
async fn test_web_failure_is_tolerated() {
    let engine = engine(None, Some(Arc::new(BrokenWeb)));
    engine.ingest(items(), None, None).await.unwrap();

    let response = engine.answer(QueryRequest::new("floods")).await.unwrap();
    assert_eq!(response.citations.len(), 3);
}

#[tokio::test]
async fn test_status_and_health() {
    let engine = engine(Some(StageEcho::new(None)), None);
    engine.ingest(items(), None, None).await.unwrap();

    let status = engine.status().await;
    assert_eq!(status.index.rows, 3);
    assert_eq!(status.llm_backend.as_deref(), Some("stage-echo"));
    assert_eq!(status.embedder, "hashing");
    assert!(status.web_search.is_none());

    let health = engine.health();
    assert!(health.ok);
    assert_eq!(health.env, "test");
}

#[tokio::test]
async fn test_from_config_persists_between_engines() {
    let temp = TempDir::new().unwrap();
    let mut config = config();
    config.index.path = temp.path().join("articles.index");
    config.llm.local_url = None;
    config.llm.api_key = None;
    config.web_search.api_key = None;

    {
        let engine = Engine::from_config(&config).unwrap();
        engine.ingest(items(), None, None).await.unwrap();
    }

    let engine = Engine::from_config(&config).unwrap();
    let hits = engine.search("cholera treatment", Some(1)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(engine.status().await.index.rows, 3);
}

#[tokio::test]
async fn test_ingest_sources_skips_failing_source() {
    let temp = TempDir::new().unwrap();
    let feed = temp.path().join("reports.jsonl");
    std::fs::write(
        &feed,
        "{\"title\":\"Floods in the delta\",\"summary\":\"12,000 displaced\"}\n\
         {\"title\":\"Cholera response\",\"summary\":\"Centres opened\"}\n",
    )
    .unwrap();
    let sources: Vec<Arc<dyn SourceProvider>> = vec![
        Arc::new(JsonFileSource::new(temp.path().join("missing.json"))),
        Arc::new(JsonFileSource::new(&feed)),
    ];

    let engine = engine(None, None);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let stats = engine
        .ingest_sources(
            &sources,
            Some(1),
            Some(Box::new(move |p: IngestProgress| {
                sink.lock().unwrap().push(p.committed_batches)
            })),
        )
        .await
        .unwrap();

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.batches, 2);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(engine.index().read().await.len(), 2);
}
