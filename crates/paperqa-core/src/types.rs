//! Domain types that flow through ingestion, indexing and answering.

use serde::{Deserialize, Serialize};

/// Extracted text of one PDF plus the path it came from.
///
/// Only PDFs with non-empty text become documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub source_path: String,
    /// Prefix of chunk ids. Defaults to the file stem.
    pub doc_id: String,
}

impl Document {
    pub fn new(text: impl Into<String>, source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let doc_id = std::path::Path::new(&source_path)
            .file_stem()
            .map_or_else(|| source_path.clone(), |s| s.to_string_lossy().to_string());
        Self { text: text.into(), source_path, doc_id }
    }

    #[must_use]
    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = doc_id.into();
        self
    }
}

/// A bounded window of a document's text that is embedded and indexed.
///
/// - `id`: `<doc id>:<chunk_index>`, the doc id being the path below the corpus root without extension
/// - `source_path`: inherited verbatim from the parent [`Document`]
/// - `chunk_index`/`total_chunks`: position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source_path: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A retrieved chunk. `score` is store-specific but higher is always better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
