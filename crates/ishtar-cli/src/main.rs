//! Ishtar CLI
//!
//! Ingest humanitarian feeds and ask grounded questions about them.

use anyhow::Result;
use clap::Parser;
use ishtar_core::error::exit_codes;
use ishtar_core::{Config, Engine, IshtarError};
use std::process::ExitCode;
use std::sync::Arc;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<IshtarError>()
                .map(IshtarError::exit_code)
                .unwrap_or(exit_codes::GENERAL_ERROR);
            ExitCode::from(code as u8)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config.validate()?;
            config
        }
        None => Config::load()?,
    };
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let engine = || Engine::from_config(&config);

    match cli.command {
        Commands::Ingest(args) => commands::ingest::run(args, &engine()?, cli.verbose).await,
        Commands::Search(args) => commands::search::run_search(args, &engine()?, cli.format).await,
        Commands::Ask(args) => commands::search::run_ask(args, &engine()?, cli.format).await,
        Commands::Status => commands::status::run(&engine()?, cli.format).await,
        Commands::Health => commands::status::run_health(&config, cli.format),
        Commands::Mcp => ishtar_mcp::start_server(Arc::new(engine()?)).await,
    }
}
