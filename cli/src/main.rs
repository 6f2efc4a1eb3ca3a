//! `docqa`: answer questions about one document.
//!
//! # Commands
//!
//! - `ingest`: load a document, split it into chunks, embed and persist them
//! - `ask`: answer one question from the ingested document
//! - `chat`: answer questions read from stdin, one per line
//! - `stats`: describe the vector store

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod app;
mod commands;
mod config;
mod render;

use config::AppConfig;

/// Question answering over a single document.
#[derive(Debug, Parser)]
#[command(name = "docqa", version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ./docqa.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vector store directory.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load, chunk, embed and store a document
    Ingest(commands::IngestArgs),
    /// Answer a question from the ingested document
    Ask(commands::AskArgs),
    /// Answer questions from stdin until EOF or `exit`
    Chat(commands::ChatArgs),
    /// Show vector store statistics
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store.location = store;
    }

    match cli.command {
        Commands::Ingest(args) => commands::ingest(config, args).await,
        Commands::Ask(args) => commands::ask(config, args).await,
        Commands::Chat(args) => commands::chat(config, args).await,
        Commands::Stats => commands::stats(config).await,
    }
}
