//! MCP tool handlers and the line-delimited server loop

use async_trait::async_trait;
use ishtar_core::{
    Config, Engine, HashingEmbedder, IndexOptions, LlmGateway, Result, VectorIndex,
};
use ishtar_mcp::protocol::JsonRpcRequest;
use ishtar_mcp::tools;
use ishtar_mcp::McpServer;
use serde_json::{json, Value};
use std::sync::Arc;

const DIMS: usize = 32;

struct Canned;

#[async_trait]
impl LlmGateway for Canned {
    async fn call(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
        Ok("Roughly 12,000 people were displaced.".to_string())
    }

    fn backend_name(&self) -> &str {
        "canned"
    }
}

fn engine(gateway: Option<Arc<dyn LlmGateway>>) -> Arc<Engine> {
    let mut config = Config::default();
    config.env = "test".to_string();
    config.embedding.dimensions = DIMS;
    let index = VectorIndex::in_memory(IndexOptions {
        dimensions: DIMS,
        ..Default::default()
    });
    Arc::new(Engine::new(
        config,
        index,
        Arc::new(HashingEmbedder::new(DIMS)),
        gateway,
        None,
    ))
}

fn records() -> Value {
    json!({
        "records": [
            {"id": "a", "title": "Floods in the delta", "summary": "12,000 displaced"},
            {"id": "b", "title": "Cholera response", "summary": "Treatment centres opened"}
        ],
        "batchSize": 1
    })
}

fn text_of(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap_or_default()
}

#[test]
fn test_tool_definitions() {
    let names: Vec<String> = tools::all_tool_definitions()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["ask", "search", "ingest", "status", "health"]);
}

#[tokio::test]
async fn test_ingest_then_search() {
    let engine = engine(None);

    let ingested = tools::handle_ingest(&engine, records()).await.unwrap();
    let ingested = serde_json::to_value(ingested).unwrap();
    assert_eq!(ingested["structuredContent"]["documents"], 2);
    assert_eq!(ingested["structuredContent"]["batches"], 2);

    let found = tools::handle_search(&engine, json!({"query": "floods", "k": 5}))
        .await
        .unwrap();
    let found = serde_json::to_value(found).unwrap();
    let results = found["structuredContent"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["rank"], 0);
    assert!(text_of(&found).starts_with("Found 2 results"));
}

#[tokio::test]
async fn test_search_requires_query() {
    let engine = engine(None);
    let err = tools::handle_search(&engine, json!({})).await.unwrap_err();
    assert!(err.to_string().contains("Missing query"));
}

#[tokio::test]
async fn test_ask_lists_sources() {
    let engine = engine(Some(Arc::new(Canned)));
    tools::handle_ingest(&engine, records()).await.unwrap();

    let result = tools::handle_ask(&engine, json!({"query": "How many were displaced?"}))
        .await
        .unwrap();
    let result = serde_json::to_value(result).unwrap();

    assert_eq!(
        result["structuredContent"]["answer"],
        "Roughly 12,000 people were displaced."
    );
    assert_eq!(
        result["structuredContent"]["citations"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert!(text_of(&result).contains("Sources:"));
}

#[tokio::test]
async fn test_status_and_health() {
    let engine = engine(None);
    tools::handle_ingest(&engine, records()).await.unwrap();

    let status = serde_json::to_value(tools::handle_status(&engine).await.unwrap()).unwrap();
    assert_eq!(status["structuredContent"]["index"]["rows"], 2);
    assert!(text_of(&status).contains("LLM backend: not configured"));

    let health = serde_json::to_value(tools::handle_health(&engine).unwrap()).unwrap();
    assert_eq!(health["structuredContent"], json!({"ok": true, "env": "test"}));
}

#[tokio::test]
async fn test_unknown_method_and_tool() {
    let server = McpServer::new(engine(None));

    let request: JsonRpcRequest =
        serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "method": "bogus"})).unwrap();
    let response = serde_json::to_value(server.handle_request(&request).await).unwrap();
    assert_eq!(response["error"]["code"], -32601);

    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {"name": "bogus", "arguments": {}}
    }))
    .unwrap();
    let response = serde_json::to_value(server.handle_request(&request).await).unwrap();
    assert_eq!(response["result"]["isError"], true);
    assert!(text_of(&response["result"]).contains("Unknown tool: bogus"));
}

#[tokio::test]
async fn test_serve_over_lines() {
    let server = McpServer::new(engine(None));
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        "\n",
        "not json\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );
    let mut output: Vec<u8> = Vec::new();

    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[0]["result"]["serverInfo"]["name"], "ishtar");
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert_eq!(lines[2]["id"], 2);
    assert_eq!(lines[2]["result"]["tools"].as_array().unwrap().len(), 5);
}
