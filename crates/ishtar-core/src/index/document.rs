//! Raw source records and their normalized documents

use crate::vectors::Metadata;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Prefix of every hash-derived document id
pub const DERIVED_ID_PREFIX: &str = "doc-";

/// Hex characters of the digest kept in a derived id
const DERIVED_ID_HEX_LEN: usize = 16;

/// Item as produced by a feed or data-source fetcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub meta: Option<Metadata>,
}

/// Normalized, embeddable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn source(&self) -> &str {
        self.metadata.get("source").map(String::as_str).unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.metadata.get("title").map(String::as_str).unwrap_or("")
    }

    /// Metadata stored in the index: the document metadata plus its body
    /// under `text`, so generation sees content rather than titles alone
    pub fn index_metadata(&self) -> Metadata {
        let mut meta = self.metadata.clone();
        meta.insert("text".to_string(), self.text.clone());
        meta
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `doc-` followed by the first 16 hex chars of SHA-1(`content`)
pub fn hashed_id(content: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    format!("{}{}", DERIVED_ID_PREFIX, &hex[..DERIVED_ID_HEX_LEN])
}

/// Stable id: explicit id, else source URL, else hashed title, else hashed text
pub fn derive_id(explicit: Option<&str>, source: Option<&str>, title: Option<&str>, text: &str) -> String {
    if let Some(id) = non_empty(explicit) {
        return id.to_string();
    }
    if let Some(source) = non_empty(source) {
        return source.to_string();
    }
    match non_empty(title) {
        Some(title) => hashed_id(title),
        None => hashed_id(text),
    }
}

/// Normalize a raw record into a document
pub fn normalize(item: RawItem) -> Document {
    let title = item.title.unwrap_or_default();
    let text = match non_empty(item.text.as_deref()) {
        Some(text) => text.to_string(),
        None => format!("{}\n\n{}", title, item.summary.unwrap_or_default()),
    };

    let mut metadata = item.meta.unwrap_or_default();
    metadata
        .entry("source".to_string())
        .or_insert_with(|| item.link.unwrap_or_default());
    metadata
        .entry("title".to_string())
        .or_insert_with(|| title.clone());

    let id = derive_id(
        item.id.as_deref(),
        metadata.get("source").map(String::as_str),
        metadata.get("title").map(String::as_str),
        &text,
    );

    Document { id, text, metadata }
}
