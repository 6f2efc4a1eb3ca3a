//! Subcommand handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use docqa_ingest::{IngestionConfig, IngestionPipeline};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::app;
use crate::config::AppConfig;
use crate::render;

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Document to ingest (.pdf, .txt, .md). Defaults to `ingest.source`.
    pub source: Option<PathBuf>,

    /// Maximum chunk length in characters.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks.
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Clear the vector store before adding the new chunks.
    #[arg(long)]
    pub reset: bool,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// The question to answer.
    pub question: String,

    /// Number of chunks to retrieve.
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Chat model to answer with.
    #[arg(long)]
    pub model: Option<String>,

    /// Print the full result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Number of chunks to retrieve.
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Chat model to answer with.
    #[arg(long)]
    pub model: Option<String>,
}

pub async fn ingest(mut config: AppConfig, args: IngestArgs) -> Result<()> {
    if let Some(chunk_size) = args.chunk_size {
        config.ingest.chunk_size = chunk_size;
    }
    if let Some(chunk_overlap) = args.chunk_overlap {
        config.ingest.chunk_overlap = chunk_overlap;
    }
    let Some(source) = args.source.or(config.ingest.source.take()) else {
        bail!("no document to ingest; pass a path or set DOCQA_SOURCE");
    };

    let pipeline = IngestionPipeline::new(
        IngestionConfig::new(&source)
            .with_chunking(config.ingest.chunk_size, config.ingest.chunk_overlap)
            .with_reset(args.reset),
    )?;
    let store = app::open_store(&config).await?;

    let report = pipeline
        .run(&store)
        .await
        .with_context(|| format!("failed to ingest {}", source.display()))?;

    print!(
        "{}",
        render::render_ingest_report(
            &report,
            &source.display().to_string(),
            &store.location().display().to_string()
        )
    );
    Ok(())
}

pub async fn ask(mut config: AppConfig, args: AskArgs) -> Result<()> {
    apply_query_flags(&mut config, args.k, args.model);
    let pipeline = app::build_pipeline(&config).await?;

    let state = pipeline.invoke(args.question).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", render::render_state(&state, use_color()));
    }
    Ok(())
}

/// Answer questions read line by line from stdin until EOF or `exit`.
pub async fn chat(mut config: AppConfig, args: ChatArgs) -> Result<()> {
    apply_query_flags(&mut config, args.k, args.model);
    let pipeline = app::build_pipeline(&config).await?;
    let color = use_color();
    let interactive = std::io::stdin().is_terminal();

    if interactive {
        eprintln!("Ask a question about your document (type `exit` to quit).");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        if interactive {
            eprint!("> ");
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match pipeline.invoke(question).await {
            Ok(state) => {
                let rendered = render::render_state(&state, color);
                stdout.write_all(rendered.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Err(e) => {
                debug!("Question failed: {e:?}");
                eprintln!("error: {e}");
            }
        }
    }

    info!("Chat session ended");
    Ok(())
}

pub async fn stats(config: AppConfig) -> Result<()> {
    let store = app::open_store(&config).await?;
    print!("{}", render::render_stats(&store.stats().await));
    Ok(())
}

fn apply_query_flags(config: &mut AppConfig, k: Option<usize>, model: Option<String>) {
    if let Some(k) = k {
        config.retrieval.retrieval_k = k;
    }
    if let Some(model) = model {
        config.retrieval.model_id = model;
    }
}

fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
