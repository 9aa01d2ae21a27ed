//! LanceDB connection and housekeeping helpers.
//!
//! Provides the database open function and a small key/value `meta` table
//! recording how an index was built (embedder id, dimension, row count).
use anyhow::{anyhow, Result};
use arrow_array::{RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::schema::build_meta_schema;

pub const META_TABLE: &str = "meta";
pub const META_EMBEDDER_ID: &str = "embedder_id";
pub const META_DIM: &str = "dim";
pub const META_CHUNK_COUNT: &str = "chunk_count";

pub async fn open_db(path: &Path) -> Result<Connection> {
    Ok(connect(path.to_string_lossy().as_ref()).execute().await?)
}

pub async fn has_table(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn.table_names().execute().await?.iter().any(|t| t == name))
}

/// Appends `entries` to the meta table, creating it on first write.
pub async fn write_meta(conn: &Connection, entries: &[(&str, String)]) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let now = Utc::now().timestamp_millis();
    let rb = RecordBatch::try_new(
        build_meta_schema(),
        vec![
            Arc::new(StringArray::from_iter_values(entries.iter().map(|(k, _)| *k))),
            Arc::new(StringArray::from_iter_values(entries.iter().map(|(_, v)| v.as_str()))),
            Arc::new(TimestampMillisecondArray::from(vec![now; entries.len()])),
        ],
    )?;
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(rb)].into_iter(), build_meta_schema()));
    if has_table(conn, META_TABLE).await? {
        conn.open_table(META_TABLE).execute().await?.add(reader).execute().await?;
    } else {
        conn.create_table(META_TABLE, reader).execute().await?;
    }
    Ok(())
}

/// Latest value recorded for `key`, if any.
pub async fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    if !has_table(conn, META_TABLE).await? {
        return Ok(None);
    }
    let t = conn.open_table(META_TABLE).execute().await?;
    let mut stream = t.query().only_if(format!("key = '{}'", key.replace('\'', "''"))).execute().await?;
    let mut latest: Option<(i64, String)> = None;
    while let Some(batch) = stream.try_next().await? {
        let values = batch
            .column_by_name("value")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow!("meta.value column missing"))?;
        let stamps = batch
            .column_by_name("updated_at")
            .and_then(|c| c.as_any().downcast_ref::<TimestampMillisecondArray>())
            .ok_or_else(|| anyhow!("meta.updated_at column missing"))?;
        for i in 0..batch.num_rows() {
            if latest.as_ref().map_or(true, |(ts, _)| stamps.value(i) >= *ts) {
                latest = Some((stamps.value(i), values.value(i).to_string()));
            }
        }
    }
    Ok(latest.map(|(_, v)| v))
}
