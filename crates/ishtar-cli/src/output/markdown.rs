//! Markdown output formatter

use super::{meta, FormatOptions};
use ishtar_core::{QueryResponse, SearchHit};

pub fn format_hits(hits: &[SearchHit], options: &FormatOptions) -> String {
    let mut output = String::from("# Search Results\n\n");

    for (i, h) in hits.iter().enumerate() {
        output.push_str(&format!(
            "## {}. {} (Score: {:.2})\n\n",
            i + 1,
            meta(h, "title"),
            h.score
        ));
        output.push_str(&format!("- **ID**: `{}`\n", h.id));
        let source = meta(h, "source");
        if !source.is_empty() {
            output.push_str(&format!("- **Source**: {}\n", source));
        }
        if options.full {
            output.push_str(&format!("\n{}\n", meta(h, "text")));
        }
        output.push_str("\n---\n\n");
    }

    if hits.is_empty() {
        output.push_str("*No results found*\n");
    }

    output
}

pub fn format_answer(response: &QueryResponse) -> String {
    let mut output = format!("# Answer\n\n{}\n", response.answer.trim());

    if !response.citations.is_empty() {
        output.push_str("\n## Sources\n\n");
        for c in &response.citations {
            let title = c
                .metadata
                .as_ref()
                .and_then(|m| m.get("title"))
                .map(String::as_str)
                .unwrap_or(&c.id);
            if c.source.is_empty() {
                output.push_str(&format!("- {} ({:.2})\n", title, c.score));
            } else {
                output.push_str(&format!("- [{}]({}) ({:.2})\n", title, c.source, c.score));
            }
        }
    }

    output
}
