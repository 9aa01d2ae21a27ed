//! paperqa-rag
//!
//! Retrieval-augmented answering: prompt assembly, the question pipeline,
//! answer formatting and the config-driven wiring of store, embedder and
//! chat model.

pub mod answer;
pub mod ingest;
pub mod pipeline;
pub mod prompt;

pub use answer::Answer;
pub use ingest::{build_pipeline, build_retriever, open_or_build};
pub use pipeline::QaPipeline;
pub use prompt::{build_prompt, format_context, PROMPT_TEMPLATE};
