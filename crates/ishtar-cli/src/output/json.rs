//! JSON output formatter

use super::{meta, FormatOptions};
use ishtar_core::{QueryResponse, SearchHit};

pub fn format_hits(hits: &[SearchHit], options: &FormatOptions) -> String {
    let output: Vec<serde_json::Value> = hits
        .iter()
        .map(|h| {
            let mut value = serde_json::json!({
                "rank": h.rank,
                "id": h.id,
                "score": h.score,
                "title": meta(h, "title"),
                "source": meta(h, "source"),
            });
            if options.full {
                value["text"] = serde_json::Value::from(meta(h, "text"));
            }
            value
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string()) + "\n"
}

pub fn format_answer(response: &QueryResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
