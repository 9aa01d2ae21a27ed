use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use paperqa_cli::{apply_data_dir, apply_k, init_tracing, load_config};
use paperqa_core::config::AppConfig;
use paperqa_embed::get_default_embedder;
use paperqa_rag::{build_pipeline, open_or_build};
use paperqa_vector::{is_populated, LanceVectorStore};

#[derive(Parser)]
#[command(name = "paperqa", version, about = "Ask questions about a directory of PDF papers")]
struct Cli {
    /// Config file (defaults to ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the vector index from the PDF directory (no-op if one exists)
    Ingest {
        /// PDF directory, overrides data.pdf_dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Delete the existing index and re-embed everything
        #[arg(long)]
        rebuild: bool,
    },
    /// Answer a question from the indexed papers
    Ask {
        question: String,
        /// Number of chunks to retrieve, overrides retrieval.k
        #[arg(long)]
        k: Option<usize>,
    },
    /// Show where the index lives and what it holds
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    debug!(pdf_dir = %config.pdf_dir().display(), index_dir = %config.index_dir().display(), "config loaded");
    match cli.command {
        Command::Ingest { data_dir, rebuild } => ingest(&mut config, data_dir, rebuild).await,
        Command::Ask { question, k } => ask(&mut config, &question, k).await,
        Command::Status => status(&config).await,
    }
}

async fn ingest(config: &mut AppConfig, data_dir: Option<PathBuf>, rebuild: bool) -> Result<()> {
    apply_data_dir(config, data_dir);
    let index_dir = config.index_dir();
    if is_populated(&index_dir) && !rebuild {
        println!("Index already present at {} (use --rebuild to re-embed)", index_dir.display());
    }
    let embedder = get_default_embedder(&config.embedding)?;
    let store = open_or_build(config, embedder.as_ref(), rebuild).await?;
    println!("✅ Index ready: {} chunks at {}", store.count_rows().await?, index_dir.display());
    Ok(())
}

async fn ask(config: &mut AppConfig, question: &str, k: Option<usize>) -> Result<()> {
    apply_k(config, k)?;
    let pipeline = build_pipeline(config).await?;
    let answer = pipeline.ask(question).await?;
    println!("{answer}");
    Ok(())
}

async fn status(config: &AppConfig) -> Result<()> {
    let index_dir = config.index_dir();
    println!("PDF directory:   {}", config.pdf_dir().display());
    println!("Index directory: {}", index_dir.display());
    if !is_populated(&index_dir) {
        println!("Index: not built (run `paperqa ingest`)");
        return Ok(());
    }
    let store = LanceVectorStore::open(&index_dir, &config.data.table).await?;
    println!("Table:           {}", store.table_name());
    println!("Chunks:          {}", store.count_rows().await?);
    println!("Built with:      {}", store.embedder_id().await?.unwrap_or_else(|| "unknown".to_string()));
    println!("Configured:      {:?} ({})", config.embedding.provider, config.embedding.model);
    Ok(())
}
