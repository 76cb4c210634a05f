//! Progress reporting for ingestion

use ishtar_core::index::IngestProgress;
use std::io::{self, Write};

/// Renders ingestion progress on stderr
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn callback() -> Box<dyn Fn(IngestProgress) + Send + Sync> {
        Box::new(|p: IngestProgress| {
            eprint!(
                "\r{:<50}",
                format!(
                    "Ingesting: {}/{} documents ({} batches)",
                    p.committed_documents, p.total_documents, p.committed_batches
                )
            );
            io::stderr().flush().ok();
        })
    }

    pub fn finish(documents: usize, batches: usize) {
        eprintln!("\rDone ({} documents, {} batches)            ", documents, batches);
    }
}
