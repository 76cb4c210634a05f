//! HTTP-based embedder using an OpenAI-compatible embeddings service

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::{IshtarError, Result};
use crate::http::{build_client, check_status, send_error};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Embedder that uses external HTTP service (vLLM, OpenAI, etc.)
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let url = config.url.clone().ok_or_else(|| {
            IshtarError::Config("embedding.url is required for the http embedder".to_string())
        })?;
        Ok(Self {
            http_client: build_client(config.timeout_secs)?,
            url: url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            dimensions: config.dimensions,
        })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| IshtarError::Backend("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let url = format!("{}/v1/embeddings", self.url);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req
            .send()
            .await
            .map_err(|e| send_error("Embedding service", &url, e))?;
        let response = check_status("Embedding service", response).await?;
        let mut body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| IshtarError::Backend(format!("Malformed embedding response: {}", e)))?;

        if body.data.len() != texts.len() {
            return Err(IshtarError::Backend(format!(
                "Embedding service returned {} vectors for {} texts",
                body.data.len(),
                texts.len()
            )));
        }
        body.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        let mut embeddings = Vec::with_capacity(body.data.len());
        for item in body.data {
            if item.embedding.len() != self.dimensions {
                return Err(IshtarError::validation(format!(
                    "Embedding service returned dimension {}, expected {}",
                    item.embedding.len(),
                    self.dimensions
                )));
            }
            embeddings.push(item.embedding);
        }

        tracing::debug!(
            "Embedded {} texts via {} in {}ms",
            texts.len(),
            self.model,
            start.elapsed().as_millis()
        );
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
