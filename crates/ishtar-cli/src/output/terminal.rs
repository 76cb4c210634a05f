//! Terminal output formatter

use super::{meta, FormatOptions};
use ishtar_core::{QueryResponse, SearchHit};

const PREVIEW_LINES: usize = 5;

pub fn format_hits(hits: &[SearchHit], options: &FormatOptions) -> String {
    if hits.is_empty() {
        return String::new();
    }

    let mut output = String::new();

    for hit in hits {
        let score_pct = (hit.score.max(0.0) * 100.0) as u32;
        let title = meta(hit, "title");
        output.push_str(&format!(
            "{:>3}% {} {}\n",
            score_pct,
            if title.is_empty() { "(untitled)" } else { title },
            hit.id
        ));

        let source = meta(hit, "source");
        if !source.is_empty() && source != hit.id {
            output.push_str(&format!("     {}\n", source));
        }

        if options.full {
            let text = meta(hit, "text");
            for line in text.lines().take(PREVIEW_LINES) {
                output.push_str(&format!("  {}\n", line));
            }
            if text.lines().count() > PREVIEW_LINES {
                output.push_str("  ...\n");
            }
        }
    }

    output
}

pub fn format_answer(response: &QueryResponse) -> String {
    let mut output = format!("{}\n", response.answer.trim());

    if !response.citations.is_empty() {
        output.push_str("\nSources:\n");
        for (i, citation) in response.citations.iter().enumerate() {
            let title = citation
                .metadata
                .as_ref()
                .and_then(|m| m.get("title"))
                .map(String::as_str)
                .unwrap_or("");
            output.push_str(&format!(
                "  [{}] {} {:.3} {} {}\n",
                i + 1,
                citation.id,
                citation.score,
                title,
                citation.source
            ));
        }
    }

    output
}
