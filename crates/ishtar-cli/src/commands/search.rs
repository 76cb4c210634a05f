//! Search and ask commands

use crate::app::{AskArgs, OutputFormat, SearchArgs};
use crate::output::{format_answer, format_search_hits, FormatOptions};
use anyhow::Result;
use ishtar_core::{Engine, QueryRequest};

pub async fn run_search(args: SearchArgs, engine: &Engine, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let hits = engine.search(&query, args.k).await?;

    if hits.is_empty() && format == OutputFormat::Cli {
        eprintln!("No results. Run 'ishtar ingest' first?");
        return Ok(());
    }

    let options = FormatOptions { full: args.full };
    print!("{}", format_search_hits(&hits, format, &options));
    Ok(())
}

pub async fn run_ask(args: AskArgs, engine: &Engine, format: OutputFormat) -> Result<()> {
    let request = QueryRequest {
        query: args.query.join(" "),
        k: args.k,
    };
    let response = engine.answer(request).await?;

    print!("{}", format_answer(&response, format));
    Ok(())
}
