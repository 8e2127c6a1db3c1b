use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cybot::{Config, CyBot, DocumentId};

mod ask;
mod build_index;
mod chat;
mod status;

#[derive(Parser)]
#[command(name = "cybot")]
#[command(about = "Answers questions about Kerala cyber laws and your own documents")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, global = true, help = "Load this config file instead of the global/project pair")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Answer a single question")]
    Ask {
        #[arg(help = "The question to answer")]
        question: String,

        #[arg(long, help = "Use this document as additional context")]
        document: Option<PathBuf>,
    },

    #[command(about = "Start an interactive session")]
    Chat {
        #[arg(long, help = "Document to load at start")]
        document: Option<PathBuf>,
    },

    #[command(about = "Build the knowledge-base index from a law-section corpus")]
    BuildIndex {
        #[arg(long, help = "JSON array of law sections")]
        input: PathBuf,

        #[arg(long, help = "Where to write the index (default: knowledge_base.index_path)")]
        output: Option<PathBuf>,
    },

    #[command(about = "Show configuration and index status")]
    Status,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Ask { question, document } => {
            ask::run(&config, &question, document.as_deref(), cli.json).await
        }
        Commands::Chat { document } => chat::run(&config, document.as_deref()).await,
        Commands::BuildIndex { input, output } => {
            build_index::run(&config, &input, output.as_deref(), cli.json).await
        }
        Commands::Status => status::run(&config, cli.json),
    }
}

async fn ingest_file(bot: &CyBot, path: &Path) -> Result<DocumentId> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let id = bot
        .ingest_document(&raw)
        .await
        .with_context(|| format!("cannot ingest {}", path.display()))?;
    Ok(id)
}
