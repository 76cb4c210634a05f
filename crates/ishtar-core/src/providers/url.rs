//! HTTP source: GETs a JSON array of raw records from a feed endpoint

use super::json::parse_records;
use crate::error::{IshtarError, Result};
use crate::http::{build_client, check_status, send_error};
use crate::index::RawItem;
use crate::providers::SourceProvider;
use async_trait::async_trait;
use reqwest::Client;

/// Default timeout for source fetches
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;

pub struct HttpJsonSource {
    client: Client,
    url: String,
    name: String,
}

impl HttpJsonSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let url = url.into();
        Ok(Self {
            client: build_client(timeout_secs)?,
            name: format!("http:{}", url),
            url,
        })
    }

    /// Use a caller-provided client
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        let url = url.into();
        Self {
            client,
            name: format!("http:{}", url),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn error(&self, e: IshtarError) -> IshtarError {
        IshtarError::Source {
            source_name: self.name.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl SourceProvider for HttpJsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawItem>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.error(send_error("source", &self.url, e)))?;
        let response = check_status("source", response)
            .await
            .map_err(|e| self.error(e))?;

        let body = response
            .text()
            .await
            .map_err(|e| self.error(IshtarError::Http(e)))?;
        let items = parse_records(&body).map_err(|e| self.error(IshtarError::Serialization(e)))?;

        tracing::debug!("Fetched {} records from {}", items.len(), self.url);
        Ok(items)
    }
}
