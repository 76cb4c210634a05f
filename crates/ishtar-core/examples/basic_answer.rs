// Basic ingest + answer example using Ishtar as a library
//
// Uses the hashing embedder and a temporary index. Set ISHTAR_LLM_URL (vLLM)
// or OPENAI_API_KEY to get generated answers; otherwise the engine replies
// with its unconfigured placeholder.

use ishtar_core::{Config, Engine, QueryRequest, RawItem};

#[tokio::main]
async fn main() -> ishtar_core::Result<()> {
    println!("Ishtar Basic Answer Example\n");

    let mut config = Config::default();
    config.embedding.dimensions = 384;
    config.index.path = std::env::temp_dir().join("ishtar_example").join("articles.index");
    config.apply_env(|key| std::env::var(key).ok());

    println!("Opening index at: {}", config.index.path.display());
    let engine = Engine::from_config(&config)?;

    let items: Vec<RawItem> = serde_json::from_str(
        r#"[
            {"title": "Floods in the delta", "summary": "Heavy rains displaced 12,000 people.", "link": "https://example.org/floods"},
            {"title": "Cholera response", "summary": "Health partners opened three treatment centres.", "link": "https://example.org/cholera"},
            {"title": "Market prices", "summary": "Staple food prices rose 30% since January."}
        ]"#,
    )?;

    let stats = engine.ingest(items, None, None).await?;
    println!("Ingested {} documents in {} batch(es)\n", stats.documents, stats.batches);

    let response = engine
        .answer(QueryRequest::new("How many people were displaced by floods?").with_k(2))
        .await?;

    println!("Answer:\n{}\n", response.answer);
    println!("Citations:");
    for citation in &response.citations {
        println!("  [{:.3}] {} {}", citation.score, citation.id, citation.source);
    }

    Ok(())
}
