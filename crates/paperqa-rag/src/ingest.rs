//! Wires the store, embedder and chat model from an [`AppConfig`].

use anyhow::Result;
use std::sync::Arc;

use paperqa_core::config::AppConfig;
use paperqa_core::data_processor::DataProcessor;
use paperqa_core::splitter::RecursiveSplitter;
use paperqa_core::traits::Embedder;
use paperqa_core::Error;
use paperqa_embed::get_default_embedder;
use paperqa_llm::OpenAiChatClient;
use paperqa_vector::{bootstrap, remove_index, LanceVectorStore, VectorRetriever};

/// Loads the index at `data.index_dir`, or builds it from the PDFs under
/// `data.pdf_dir` when absent or empty. `rebuild` drops the existing index first.
pub async fn open_or_build(config: &AppConfig, embedder: &dyn Embedder, rebuild: bool) -> Result<LanceVectorStore> {
    let index_dir = config.index_dir();
    if rebuild {
        remove_index(&index_dir, &config.data.table, &config.pdf_dir())?;
    }
    let pdf_dir = config.pdf_dir();
    let splitter = RecursiveSplitter::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
    let load_chunks = || -> Result<_> {
        println!("📂 Building index from {}", pdf_dir.display());
        let chunks = DataProcessor::new(splitter).process_directory(&pdf_dir)?;
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus(pdf_dir.clone()).into());
        }
        Ok(chunks)
    };
    bootstrap(&index_dir, &config.data.table, embedder, config.embedding.batch_size, load_chunks).await
}

pub async fn build_retriever(config: &AppConfig, rebuild: bool) -> Result<VectorRetriever> {
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&config.embedding)?);
    let store = open_or_build(config, embedder.as_ref(), rebuild).await?;
    Ok(VectorRetriever::new(store, embedder))
}

pub async fn build_pipeline(config: &AppConfig) -> Result<crate::QaPipeline<VectorRetriever, OpenAiChatClient>> {
    let retriever = build_retriever(config, false).await?;
    let chat = OpenAiChatClient::new(&config.llm)?;
    Ok(crate::QaPipeline::new(retriever, chat, config.retrieval.k))
}
