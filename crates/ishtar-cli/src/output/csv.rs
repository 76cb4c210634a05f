//! CSV output formatter

use super::meta;
use ishtar_core::{QueryResponse, SearchHit};

pub fn format_hits(hits: &[SearchHit]) -> String {
    let mut output = String::from("rank,id,score,title,source\n");

    for h in hits {
        output.push_str(&format!(
            "{},{},{},{},{}\n",
            h.rank,
            escape_csv(&h.id),
            h.score,
            escape_csv(meta(h, "title")),
            escape_csv(meta(h, "source"))
        ));
    }

    output
}

/// Citations only; use JSON for the answer text
pub fn format_citations(response: &QueryResponse) -> String {
    let mut output = String::from("id,score,source\n");

    for c in &response.citations {
        output.push_str(&format!(
            "{},{},{}\n",
            escape_csv(&c.id),
            c.score,
            escape_csv(&c.source)
        ));
    }

    output
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
