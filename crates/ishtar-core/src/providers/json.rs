//! JSON file source: a JSON array or JSON-lines file of raw records

use crate::error::{IshtarError, Result};
use crate::index::RawItem;
use crate::providers::SourceProvider;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads raw records from a local file
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl std::fmt::Display) -> IshtarError {
        IshtarError::Source {
            source_name: self.name.clone(),
            message: message.to_string(),
        }
    }
}

/// Parse either a JSON array of records or one record per non-blank line
pub fn parse_records(content: &str) -> std::result::Result<Vec<RawItem>, serde_json::Error> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

#[async_trait]
impl SourceProvider for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawItem>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.error(format!("failed to read {}: {}", self.path.display(), e)))?;

        let items = parse_records(&content)
            .map_err(|e| self.error(format!("failed to parse {}: {}", self.path.display(), e)))?;

        tracing::debug!("Read {} records from {}", items.len(), self.path.display());
        Ok(items)
    }
}
