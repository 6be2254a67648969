//! Ragmark CLI
//!
//! Local RAG search for your markdown notes.

use anyhow::Result;
use clap::Parser;
use ragmark_core::{Config, Database, RagmarkError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        let code = e
            .downcast_ref::<RagmarkError>()
            .map(RagmarkError::exit_code)
            .unwrap_or(ragmark_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    // Database path: flag (or RAGMARK_DB) > config file > default
    let db_path = cli
        .db_path
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(Database::default_path);

    match cli.command {
        Commands::Index(args) => commands::index::run(args, &db_path, &config).await,
        Commands::Search(args) => commands::search::run(args, &db_path, &config).await,
        Commands::Delete => commands::delete::run().await,
    }
}
