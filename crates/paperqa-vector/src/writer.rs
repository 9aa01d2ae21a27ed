use anyhow::{bail, Result};
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use paperqa_core::traits::Embedder;
use paperqa_core::Chunk;

use crate::schema::build_chunk_schema;
use crate::table::{has_table, open_db, write_meta, META_CHUNK_COUNT, META_DIM, META_EMBEDDER_ID};

/// Embeds chunks in batches and appends them to a LanceDB table.
pub struct LanceDbIndexer {
    db: Connection,
    table_name: String,
}

impl LanceDbIndexer {
    pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = open_db(db_path).await?;
        Ok(Self { db, table_name: table_name.to_string() })
    }

    pub fn connection(&self) -> &Connection { &self.db }

    /// Embeds every chunk exactly once and writes it with its vector.
    /// Records the embedder id, dimension and row count in the meta table.
    pub async fn index_chunks(&self, chunks: &[Chunk], embedder: &dyn Embedder, batch_size: usize) -> Result<usize> {
        if chunks.is_empty() {
            println!("No chunks to index");
            return Ok(0);
        }
        println!("Indexing {} chunks into LanceDB table: {}", chunks.len(), self.table_name);
        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?
                .progress_chars("#>-"),
        );

        let mut dim: Option<usize> = None;
        let mut processed = 0usize;
        for batch in chunks.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                bail!("embedder returned {} vectors for {} texts", vectors.len(), batch.len());
            }
            let width = *dim.get_or_insert_with(|| vectors.first().map_or(0, Vec::len));
            self.insert_batch(batch, vectors, width).await?;
            processed += batch.len();
            pb.set_position(processed as u64);
            pb.set_message(format!("batch of {}", batch.len()));
            debug!(processed, total = chunks.len(), "inserted batch");
        }
        pb.finish_with_message("✅ LanceDB indexing completed!");

        let dim = dim.unwrap_or_default();
        if dim != embedder.dim() {
            warn!(configured = embedder.dim(), actual = dim, "embedding width differs from configured dim");
        }
        write_meta(
            &self.db,
            &[
                (META_EMBEDDER_ID, embedder.embedder_id().to_string()),
                (META_DIM, dim.to_string()),
                (META_CHUNK_COUNT, processed.to_string()),
            ],
        )
        .await?;
        println!("📊 Successfully indexed {processed} chunks into LanceDB");
        Ok(processed)
    }

    async fn insert_batch(&self, chunks: &[Chunk], vectors: Vec<Vec<f32>>, dim: usize) -> Result<()> {
        let record_batch = chunks_to_record_batch(chunks, vectors, dim)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        if has_table(&self.db, &self.table_name).await? {
            self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
        } else {
            self.db.create_table(&self.table_name, reader).execute().await?;
        }
        Ok(())
    }
}

pub fn chunks_to_record_batch(chunks: &[Chunk], vectors: Vec<Vec<f32>>, dim: usize) -> Result<RecordBatch> {
    if vectors.len() != chunks.len() {
        bail!("{} vectors for {} chunks", vectors.len(), chunks.len());
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        bail!("vector width {} does not match table width {dim}", bad.len());
    }
    let dim = i32::try_from(dim)?;
    let mut chunk_indices = Vec::with_capacity(chunks.len());
    let mut total_chunks = Vec::with_capacity(chunks.len());
    for c in chunks {
        chunk_indices.push(i32::try_from(c.chunk_index)?);
        total_chunks.push(i32::try_from(c.total_chunks)?);
    }
    let hashes: Vec<String> = chunks.iter().map(|c| blake3::hash(c.text.as_bytes()).to_hex().to_string()).collect();
    let vectors = vectors.into_iter().map(|v| Some(v.into_iter().map(Some).collect::<Vec<_>>()));
    let record_batch = RecordBatch::try_new(
        build_chunk_schema(dim),
        vec![
            Arc::new(StringArray::from_iter_values(chunks.iter().map(|c| c.id.as_str()))),
            Arc::new(StringArray::from_iter_values(chunks.iter().map(|c| c.source_path.as_str()))),
            Arc::new(StringArray::from_iter_values(chunks.iter().map(|c| c.text.as_str()))),
            Arc::new(StringArray::from(hashes)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(Int32Array::from(total_chunks)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, dim)),
        ],
    )?;
    Ok(record_batch)
}
