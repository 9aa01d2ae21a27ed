//! paperqa-core
//!
//! Domain types, the seams shared by the other crates (`Embedder`,
//! `Retriever`, `ChatModel`), configuration, and the ingestion front half:
//! PDF text extraction, document assembly and recursive chunk splitting.

pub mod config;
pub mod data_processor;
pub mod error;
pub mod pdf;
pub mod splitter;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Chunk, Document, ScoredChunk};
