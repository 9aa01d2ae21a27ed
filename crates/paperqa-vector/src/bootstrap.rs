//! Load-or-build for the persisted index directory.
//!
//! A non-empty directory is trusted as-is: no embedding calls and no check
//! against the current corpus. Anything else is a cold start.

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use paperqa_core::traits::Embedder;
use paperqa_core::Chunk;

use crate::search::LanceVectorStore;
use crate::table::META_TABLE;
use crate::writer::LanceDbIndexer;

/// True when `dir` exists and has at least one entry.
pub fn is_populated(dir: &Path) -> bool {
    fs::read_dir(dir).map(|mut entries| entries.next().is_some()).unwrap_or(false)
}

/// Deletes a persisted index so the next bootstrap rebuilds it.
///
/// Refuses when `dir` holds neither the `table` nor the meta table, or when
/// `corpus_dir` lives inside it.
pub fn remove_index(dir: &Path, table: &str, corpus_dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    if is_within(corpus_dir, dir) {
        bail!(
            "refusing to remove {}: it contains the PDF directory {}",
            dir.display(),
            corpus_dir.display()
        );
    }
    let has_index = [table, META_TABLE].iter().any(|name| dir.join(format!("{name}.lance")).exists());
    if is_populated(dir) && !has_index {
        bail!("refusing to remove {}: no '{table}' index found there", dir.display());
    }
    fs::remove_dir_all(dir)?;
    println!("🗑️  Removed index at {}", dir.display());
    Ok(())
}

/// True when `path` is `ancestor` or below it.
fn is_within(path: &Path, ancestor: &Path) -> bool {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let ancestor = ancestor.canonicalize().unwrap_or_else(|_| ancestor.to_path_buf());
    path.starts_with(&ancestor)
}

/// Opens the index at `index_dir`, building it from `load_chunks` first if the
/// directory is absent or empty. `load_chunks` only runs on a cold start.
pub async fn bootstrap<F>(
    index_dir: &Path,
    table: &str,
    embedder: &dyn Embedder,
    batch_size: usize,
    load_chunks: F,
) -> Result<LanceVectorStore>
where
    F: FnOnce() -> Result<Vec<Chunk>>,
{
    if is_populated(index_dir) {
        let store = LanceVectorStore::open(index_dir, table).await?;
        match store.embedder_id().await? {
            Some(recorded) if recorded != embedder.embedder_id() => warn!(
                recorded = %recorded,
                current = embedder.embedder_id(),
                "index was built with a different embedder; use --rebuild to re-embed"
            ),
            _ => {}
        }
        info!(path = %index_dir.display(), "loaded existing index");
        return Ok(store);
    }

    let chunks = load_chunks()?;
    if chunks.is_empty() {
        bail!("nothing to index: no chunks for {}", index_dir.display());
    }
    fs::create_dir_all(index_dir)?;
    info!(path = %index_dir.display(), chunks = chunks.len(), "building index");
    if let Err(e) = build(index_dir, table, embedder, batch_size, &chunks).await {
        // A partial directory would be loaded as-is next time.
        if let Err(cleanup) = fs::remove_dir_all(index_dir) {
            warn!(error = %cleanup, "failed to remove partial index");
        }
        return Err(e);
    }
    LanceVectorStore::open(index_dir, table).await
}

async fn build(index_dir: &Path, table: &str, embedder: &dyn Embedder, batch_size: usize, chunks: &[Chunk]) -> Result<()> {
    let indexer = LanceDbIndexer::new(index_dir, table).await?;
    indexer.index_chunks(chunks, embedder, batch_size).await?;
    Ok(())
}
