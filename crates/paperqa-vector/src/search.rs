use anyhow::{anyhow, Context, Result};
use arrow_array::{Array, Float32Array, Int32Array, RecordBatch, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use paperqa_core::traits::{Embedder, Retriever};
use paperqa_core::{Chunk, ScoredChunk};

use crate::table::{get_meta, has_table, open_db, META_EMBEDDER_ID};

/// An opened, populated chunks table.
pub struct LanceVectorStore {
    db: Connection,
    table_name: String,
    path: PathBuf,
}

impl LanceVectorStore {
    pub async fn open(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = open_db(db_path).await?;
        if !has_table(&db, table_name).await? {
            return Err(anyhow!("table '{table_name}' not found in {}", db_path.display()));
        }
        Ok(Self { db, table_name: table_name.to_string(), path: db_path.to_path_buf() })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn table_name(&self) -> &str { &self.table_name }

    pub async fn count_rows(&self) -> Result<usize> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        Ok(table.count_rows(None).await?)
    }

    /// Embedder id recorded when the index was built.
    pub async fn embedder_id(&self) -> Result<Option<String>> {
        get_meta(&self.db, META_EMBEDDER_ID).await
    }

    /// Cosine nearest neighbours of `q_vec`, best first, `score = 1 - distance`.
    pub async fn search_vec(&self, q_vec: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .vector_search(q_vec.to_vec())?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            hits.extend(rows_to_scored_chunks(&batch)?);
        }
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .with_context(|| format!("column '{name}' missing or not utf8"))
}

fn int_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .with_context(|| format!("column '{name}' missing or not int32"))
}

fn rows_to_scored_chunks(batch: &RecordBatch) -> Result<Vec<ScoredChunk>> {
    let ids = string_col(batch, "id")?;
    let paths = string_col(batch, "source_path")?;
    let contents = string_col(batch, "content")?;
    let indices = int_col(batch, "chunk_index")?;
    let totals = int_col(batch, "total_chunks")?;
    let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
    let mut out = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let score = distances.filter(|d| !d.is_null(i)).map_or(0.0, |d| 1.0 - d.value(i));
        out.push(ScoredChunk {
            chunk: Chunk {
                id: ids.value(i).to_string(),
                text: contents.value(i).to_string(),
                source_path: paths.value(i).to_string(),
                chunk_index: usize::try_from(indices.value(i))?,
                total_chunks: usize::try_from(totals.value(i))?,
            },
            score,
        });
    }
    Ok(out)
}

/// Embeds the query once and searches the store.
pub struct VectorRetriever {
    store: LanceVectorStore,
    embedder: Arc<dyn Embedder>,
}

impl VectorRetriever {
    pub fn new(store: LanceVectorStore, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    pub fn store(&self) -> &LanceVectorStore { &self.store }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let q_vec = self
            .embedder
            .embed_batch(&[query.to_string()])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        self.store.search_vec(&q_vec, k).await
    }
}
