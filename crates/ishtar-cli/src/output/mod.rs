//! Output formatters

pub mod csv;
pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use ishtar_core::{QueryResponse, SearchHit};

/// Format options
pub struct FormatOptions {
    /// Include document text
    pub full: bool,
}

/// Metadata value or empty string
pub(crate) fn meta<'a>(hit: &'a SearchHit, key: &str) -> &'a str {
    hit.metadata.get(key).map(String::as_str).unwrap_or("")
}

/// Format search hits
pub fn format_search_hits(
    hits: &[SearchHit],
    format: OutputFormat,
    options: &FormatOptions,
) -> String {
    match format {
        OutputFormat::Json => json::format_hits(hits, options),
        OutputFormat::Csv => csv::format_hits(hits),
        OutputFormat::Md => markdown::format_hits(hits, options),
        OutputFormat::Cli => terminal::format_hits(hits, options),
    }
}

/// Format an answer with its citations
pub fn format_answer(response: &QueryResponse, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_answer(response),
        OutputFormat::Csv => csv::format_citations(response),
        OutputFormat::Md => markdown::format_answer(response),
        OutputFormat::Cli => terminal::format_answer(response),
    }
}
