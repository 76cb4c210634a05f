//! Status and health commands

use crate::app::OutputFormat;
use anyhow::Result;
use ishtar_core::{Config, Engine, Health};

pub async fn run(engine: &Engine, format: OutputFormat) -> Result<()> {
    let status = engine.status().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        _ => {
            let path = status
                .index
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(in memory)".to_string());

            println!("Environment:     {}", status.env);
            println!();
            println!("Index:");
            println!("  Path:          {}", path);
            println!("  Rows:          {}", status.index.rows);
            println!("  Unique IDs:    {}", status.index.unique_ids);
            println!("  Dimensions:    {}", status.index.dimensions);
            println!(
                "  Backend:       {}{}",
                status.index.backend.as_str(),
                if status.index.ann_built { " (graph built)" } else { "" }
            );
            println!();
            println!("Embedder:        {}", status.embedder);
            println!("Compressor:      {}", status.compressor);
            println!(
                "LLM backend:     {}",
                status.llm_backend.as_deref().unwrap_or("not configured")
            );
            println!(
                "Web search:      {}",
                status.web_search.as_deref().unwrap_or("disabled")
            );
        }
    }
    Ok(())
}

/// Liveness only; does not open the index
pub fn run_health(config: &Config, format: OutputFormat) -> Result<()> {
    let health = Health::for_env(config.env.clone());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&health)?),
        _ => println!("ok (env: {})", health.env),
    }
    Ok(())
}
