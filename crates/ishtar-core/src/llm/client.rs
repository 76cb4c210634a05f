//! HTTP completion client for the answer pipeline (vLLM/TGI or hosted OpenAI)

use super::LlmGateway;
use crate::config::LLMServiceConfig;
use crate::error::{IshtarError, Result};
use crate::http::{build_client, check_status, send_error};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Which completion endpoint is active. Chosen once from configuration;
/// there is no per-call fallback between the two.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionBackend {
    /// Locally hosted completion-compatible server
    Local {
        base_url: String,
        model: Option<String>,
    },
    /// Hosted provider API
    Hosted {
        base_url: String,
        model: String,
        api_key: String,
    },
}

impl CompletionBackend {
    /// Local server if configured, else the hosted API if a key exists, else none
    pub fn select(config: &LLMServiceConfig) -> Option<Self> {
        if let Some(url) = config.local_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Some(Self::Local {
                base_url: url.trim_end_matches('/').to_string(),
                model: config.local_model.clone(),
            });
        }
        config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|key| Self::Hosted {
                base_url: config.hosted_url.trim_end_matches('/').to_string(),
                model: config.hosted_model.clone(),
                api_key: key.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Hosted { .. } => "hosted",
        }
    }

    fn base_url(&self) -> &str {
        match self {
            Self::Local { base_url, .. } | Self::Hosted { base_url, .. } => base_url,
        }
    }
}

/// Completion client over the selected backend
pub struct CompletionClient {
    http_client: reqwest::Client,
    backend: CompletionBackend,
}

impl CompletionClient {
    pub fn new(backend: CompletionBackend, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http_client: build_client(timeout_secs)?,
            backend,
        })
    }

    /// Build the configured client, or `None` when no backend is configured
    pub fn from_config(config: &LLMServiceConfig) -> Result<Option<Self>> {
        CompletionBackend::select(config)
            .map(|backend| Self::new(backend, config.timeout_secs))
            .transpose()
    }

    pub fn backend(&self) -> &CompletionBackend {
        &self.backend
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[async_trait]
impl LlmGateway for CompletionClient {
    async fn call(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let start = Instant::now();
        let url = format!("{}/v1/completions", self.backend.base_url());

        let model = match &self.backend {
            CompletionBackend::Local { model, .. } => model.as_deref(),
            CompletionBackend::Hosted { model, .. } => Some(model.as_str()),
        };
        let request = CompletionRequest {
            model,
            prompt,
            max_tokens,
            temperature,
        };

        let mut req = self.http_client.post(&url).json(&request);
        if let CompletionBackend::Hosted { api_key, .. } = &self.backend {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req
            .send()
            .await
            .map_err(|e| send_error("LLM service", &url, e))?;
        let response = check_status("LLM service", response).await?;
        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| IshtarError::Backend(format!("Malformed completion response: {}", e)))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| IshtarError::Backend("No completion returned".to_string()))?;

        tracing::debug!(
            "Completion via {} backend: {} chars in {}ms",
            self.backend.name(),
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
