//! Source provider abstraction
//!
//! Feeds and data sources that produce raw records for ingestion:
//! - Local JSON / JSON-lines files
//! - HTTP endpoints serving a JSON array
//!
//! `fetch_all` fans out over every source concurrently. A failing source is
//! logged and contributes no records; the others are unaffected.

use crate::error::Result;
use crate::index::RawItem;
use futures::future::join_all;
use std::sync::Arc;

pub mod json;
pub mod url;

pub use json::JsonFileSource;
pub use url::HttpJsonSource;

/// Source provider trait - every feed implements this
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Identifier used in logs and errors
    fn name(&self) -> &str;

    /// Fetch every record currently offered by the source
    async fn fetch(&self) -> Result<Vec<RawItem>>;
}

/// Fetch from every source concurrently.
///
/// Records of surviving sources are concatenated in source order.
pub async fn fetch_all(sources: &[Arc<dyn SourceProvider>]) -> Vec<RawItem> {
    let results = join_all(sources.iter().map(|s| s.fetch())).await;

    let mut items = Vec::new();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(batch) => {
                tracing::info!("Source {} returned {} records", source.name(), batch.len());
                items.extend(batch);
            }
            Err(e) => tracing::warn!("Skipping source {}: {}", source.name(), e),
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IshtarError;

    struct StaticSource {
        name: &'static str,
        titles: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl SourceProvider for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> Result<Vec<RawItem>> {
            if self.fail {
                return Err(IshtarError::Source {
                    source_name: self.name.to_string(),
                    message: "feed down".to_string(),
                });
            }
            Ok(self
                .titles
                .iter()
                .map(|t| RawItem {
                    title: Some(t.to_string()),
                    ..Default::default()
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_failing_source_does_not_abort_others() {
        let sources: Vec<Arc<dyn SourceProvider>> = vec![
            Arc::new(StaticSource {
                name: "reliefweb",
                titles: vec!["a", "b"],
                fail: false,
            }),
            Arc::new(StaticSource {
                name: "gdacs",
                titles: vec![],
                fail: true,
            }),
            Arc::new(StaticSource {
                name: "who",
                titles: vec!["c"],
                fail: false,
            }),
        ];

        let items = fetch_all(&sources).await;
        let titles: Vec<_> = items.iter().filter_map(|i| i.title.as_deref()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_no_sources() {
        assert!(fetch_all(&[]).await.is_empty());
    }
}
