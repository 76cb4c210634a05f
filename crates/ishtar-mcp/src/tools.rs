//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::{anyhow, Result};
use ishtar_core::{Engine, QueryRequest, RawItem};
use serde_json::Value;

pub fn ask_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "ask".to_string(),
        description: "Answer a question from indexed humanitarian reports, with cited sources"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Question in natural language"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of context documents (default: 12)",
                    "minimum": 1
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn search_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "search".to_string(),
        description: "Nearest-neighbor search over indexed documents".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "k": {
                    "type": "integer",
                    "description": "Maximum results (default: 12)",
                    "minimum": 1
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn ingest_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "ingest".to_string(),
        description: "Add raw records ({id?, title?, summary?, text?, link?, meta?}) to the index"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "records": {
                    "type": "array",
                    "items": { "type": "object" }
                },
                "batchSize": {
                    "type": "integer",
                    "minimum": 1
                }
            },
            "required": ["records"]
        }),
    }
}

pub fn status_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "status".to_string(),
        description: "Index size and configured backends".to_string(),
        input_schema: serde_json::json!({ "type": "object", "properties": {} }),
    }
}

pub fn health_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "health".to_string(),
        description: "Liveness check".to_string(),
        input_schema: serde_json::json!({ "type": "object", "properties": {} }),
    }
}

pub fn all_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ask_tool_definition(),
        search_tool_definition(),
        ingest_tool_definition(),
        status_tool_definition(),
        health_tool_definition(),
    ]
}

fn query_arg(args: &Value) -> Result<&str> {
    args.get("query")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing query"))
}

fn k_arg(args: &Value) -> Option<usize> {
    args.get("k").and_then(|v| v.as_u64()).map(|k| k as usize)
}

pub async fn handle_ask(engine: &Engine, args: Value) -> Result<ToolResult> {
    let request = QueryRequest {
        query: query_arg(&args)?.to_string(),
        k: k_arg(&args),
    };
    let response = engine.answer(request).await?;

    let mut text = response.answer.clone();
    if !response.citations.is_empty() {
        text.push_str("\n\nSources:");
        for c in &response.citations {
            text.push_str(&format!("\n- {} ({:.2}) {}", c.id, c.score, c.source));
        }
    }

    Ok(ToolResult::structured(text, serde_json::to_value(&response)?))
}

pub async fn handle_search(engine: &Engine, args: Value) -> Result<ToolResult> {
    let query = query_arg(&args)?;
    let hits = engine.search(query, k_arg(&args)).await?;

    let summary = format!("Found {} results for \"{}\"", hits.len(), query);
    let structured: Vec<Value> = hits
        .iter()
        .map(|h| {
            serde_json::json!({
                "id": h.id,
                "rank": h.rank,
                "score": (h.score * 1000.0).round() / 1000.0,
                "title": h.metadata.get("title"),
                "source": h.metadata.get("source"),
            })
        })
        .collect();

    Ok(ToolResult::structured(
        summary,
        serde_json::json!({ "results": structured }),
    ))
}

pub async fn handle_ingest(engine: &Engine, args: Value) -> Result<ToolResult> {
    let records = args
        .get("records")
        .cloned()
        .ok_or_else(|| anyhow!("Missing records"))?;
    let items: Vec<RawItem> = serde_json::from_value(records)?;
    let batch_size = args
        .get("batchSize")
        .and_then(|v| v.as_u64())
        .map(|b| b as usize);

    let stats = engine.ingest(items, batch_size, None).await?;
    Ok(ToolResult::structured(
        format!(
            "Ingested {} documents in {} batch(es)",
            stats.documents, stats.batches
        ),
        serde_json::to_value(&stats)?,
    ))
}

pub async fn handle_status(engine: &Engine) -> Result<ToolResult> {
    let status = engine.status().await;
    let summary = format!(
        "Index: {} rows ({} unique), {} dimensions, backend {}\n\
         Embedder: {}\n\
         LLM backend: {}\n\
         Web search: {}",
        status.index.rows,
        status.index.unique_ids,
        status.index.dimensions,
        status.index.backend.as_str(),
        status.embedder,
        status.llm_backend.as_deref().unwrap_or("not configured"),
        status.web_search.as_deref().unwrap_or("disabled"),
    );

    Ok(ToolResult::structured(summary, serde_json::to_value(&status)?))
}

pub fn handle_health(engine: &Engine) -> Result<ToolResult> {
    let health = engine.health();
    Ok(ToolResult::structured(
        format!("ok (env: {})", health.env),
        serde_json::to_value(&health)?,
    ))
}
