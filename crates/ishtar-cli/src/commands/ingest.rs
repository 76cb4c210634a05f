//! Ingest command

use crate::app::IngestArgs;
use crate::progress::ProgressReporter;
use anyhow::{bail, Result};
use ishtar_core::providers::url::DEFAULT_SOURCE_TIMEOUT_SECS;
use ishtar_core::{Engine, HttpJsonSource, JsonFileSource, SourceProvider};
use std::sync::Arc;

pub async fn run(args: IngestArgs, engine: &Engine, verbose: bool) -> Result<()> {
    if args.files.is_empty() && args.urls.is_empty() {
        bail!("Nothing to ingest: pass JSON files or --url feeds");
    }

    let mut sources: Vec<Arc<dyn SourceProvider>> = args
        .files
        .iter()
        .map(|path| Arc::new(JsonFileSource::new(path)) as Arc<dyn SourceProvider>)
        .collect();
    for url in &args.urls {
        sources.push(Arc::new(HttpJsonSource::new(url.as_str(), DEFAULT_SOURCE_TIMEOUT_SECS)?));
    }

    let progress = verbose.then(ProgressReporter::callback);
    let stats = engine
        .ingest_sources(&sources, args.batch_size, progress)
        .await?;
    if stats.documents == 0 {
        println!("No records fetched from {} source(s)", sources.len());
        return Ok(());
    }

    if verbose {
        ProgressReporter::finish(stats.documents, stats.batches);
    }
    println!(
        "Ingested {} documents in {} batch(es)",
        stats.documents, stats.batches
    );
    Ok(())
}
