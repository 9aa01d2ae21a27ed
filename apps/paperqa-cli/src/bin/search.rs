use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use paperqa_cli::{init_tracing, load_config};
use paperqa_core::traits::{Embedder, Retriever};
use paperqa_embed::get_default_embedder;
use paperqa_vector::{LanceVectorStore, VectorRetriever};

/// Prints the chunks a question would retrieve, without calling the chat model.
#[derive(Parser)]
#[command(name = "paperqa-search", version)]
struct Args {
    query: String,
    #[arg(long, default_value_t = 10)]
    limit: usize,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let index_dir = config.index_dir();
    println!("🔍 paperqa-search\n================");
    println!("Query: {}", args.query);
    println!("Database path: {}", index_dir.display());

    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&config.embedding)?);
    let store = LanceVectorStore::open(&index_dir, &config.data.table).await?;
    let retriever = VectorRetriever::new(store, embedder);
    let results = retriever.retrieve(&args.query, args.limit).await?;

    println!("\n🔍 Found {} results for: \"{}\"", results.len(), args.query);
    for (i, hit) in results.iter().enumerate() {
        println!("\n  {}. score={:.4}  id={}  path={}", i + 1, hit.score, hit.chunk.id, hit.chunk.source_path);
        println!("     📝 Content: {}", hit.chunk.text);
    }
    Ok(())
}
