//! Error types for ishtar

use thiserror::Error;

/// Result type alias using IshtarError
pub type Result<T> = std::result::Result<T, IshtarError>;

/// Error type alias for convenience
pub type Error = IshtarError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_INPUT: i32 = 3;
    pub const BACKEND_UNAVAILABLE: i32 = 4;
}

/// Main error type for ishtar
#[derive(Debug, Error)]
pub enum IshtarError {
    /// Caller supplied something the core refuses outright (never retried)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding, LLM or search service failed in a way that may succeed later
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Authentication rejected by {0}")]
    Auth(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("Pipeline stage '{stage}' failed: {message}")]
    Stage { stage: &'static str, message: String },

    #[error("Ingestion failed after {committed_batches} committed batch(es): {message}")]
    Ingest {
        committed_batches: usize,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IshtarError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether a caller-level retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backend(_) | Self::Source { .. } => true,
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map_or(true, |s| {
                        s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                    })
            }
            _ => false,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ if self.is_transient() => exit_codes::BACKEND_UNAVAILABLE,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
