//! CLI command handlers

pub mod ingest;
pub mod search;
pub mod status;
