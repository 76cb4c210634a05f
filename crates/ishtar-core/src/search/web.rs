//! Real-time web search layer

use super::SearchHit;
use crate::config::WebSearchConfig;
use crate::error::{IshtarError, Result};
use crate::http::{build_client, check_status, send_error};
use crate::vectors::Metadata;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Web search provider
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    fn name(&self) -> &str;
}

/// Tavily search API client
pub struct TavilySearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TavilySearch {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build from configuration; `None` when no API key is set
    pub fn from_config(config: &WebSearchConfig) -> Result<Option<Self>> {
        config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|key| Self::new(&config.url, key, config.timeout_secs))
            .transpose()
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f32,
}

fn into_hit(result: TavilyResult, rank: usize) -> SearchHit {
    let text = if result.content.is_empty() {
        result.title.clone()
    } else {
        result.content
    };

    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), result.url.clone());
    metadata.insert("title".to_string(), result.title);
    metadata.insert("text".to_string(), text);
    metadata.insert("origin".to_string(), "web".to_string());

    SearchHit {
        id: result.url,
        score: result.score,
        metadata,
        rank,
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if max_results == 0 {
            return Err(IshtarError::validation("max_results must be > 0"));
        }

        let url = format!("{}/search", self.base_url);
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results,
            search_depth: "basic",
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("web search", &url, e))?;
        let response = check_status("web search", response).await?;
        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| IshtarError::Backend(format!("Malformed web search response: {}", e)))?;

        let hits: Vec<SearchHit> = body
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .enumerate()
            .map(|(rank, r)| into_hit(r, rank))
            .collect();

        tracing::debug!("Web search returned {} results", hits.len());
        Ok(hits)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
