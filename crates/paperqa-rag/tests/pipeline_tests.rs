use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use paperqa_core::traits::{ChatModel, Retriever};
use paperqa_core::{Chunk, ScoredChunk};
use paperqa_rag::QaPipeline;

/// Returns fixed chunks and records the requested k.
struct StubRetriever {
    hits: Vec<ScoredChunk>,
    asked_k: Mutex<Option<usize>>,
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        *self.asked_k.lock().unwrap() = Some(k);
        Ok(self.hits.iter().take(k).cloned().collect())
    }
}

/// Replies with canned text and keeps the last prompt.
struct StubChat {
    reply: Result<String, String>,
    last_prompt: Mutex<Option<String>>,
}

#[async_trait]
impl ChatModel for StubChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

fn hit(path: &str, i: usize, text: &str, score: f32) -> ScoredChunk {
    ScoredChunk {
        chunk: Chunk {
            id: format!("doc:{i}"),
            text: text.to_string(),
            source_path: path.to_string(),
            chunk_index: i,
            total_chunks: 2,
        },
        score,
    }
}

fn two_document_corpus() -> Vec<ScoredChunk> {
    vec![
        hit("/papers/attention.pdf", 0, "Attention maps queries to weighted values.", 0.9),
        hit("/papers/rag.pdf", 0, "RAG conditions generation on retrieved passages.", 0.7),
        hit("/papers/attention.pdf", 1, "Multi-head attention uses several projections.", 0.6),
    ]
}

#[tokio::test]
async fn answer_is_stub_text_with_retrieved_sources() {
    let retriever = StubRetriever { hits: two_document_corpus(), asked_k: Mutex::new(None) };
    let chat = StubChat { reply: Ok("Attention is a weighted lookup.".to_string()), last_prompt: Mutex::new(None) };
    let pipeline = QaPipeline::new(retriever, chat, 4);

    let answer = pipeline.ask("What is attention?").await.expect("answer");

    assert_eq!(answer.text, "Attention is a weighted lookup.");
    assert_eq!(answer.sources, vec!["/papers/attention.pdf", "/papers/rag.pdf"]);
    assert_eq!(*pipeline.retriever().asked_k.lock().unwrap(), Some(4));
}

#[tokio::test]
async fn prompt_carries_context_and_question() {
    let chat = StubChat { reply: Ok("ok".to_string()), last_prompt: Mutex::new(None) };
    let retriever = StubRetriever { hits: two_document_corpus(), asked_k: Mutex::new(None) };
    let pipeline = QaPipeline::new(retriever, chat, 2);

    pipeline.ask("What is RAG?").await.expect("answer");

    let prompt = pipeline.chat().last_prompt.lock().unwrap().clone().expect("prompt sent");
    assert_eq!(
        prompt,
        "Answer the question based only on the following context:\n\n\
         Attention maps queries to weighted values.\n\n\
         RAG conditions generation on retrieved passages.\n\n\
         Question: What is RAG?"
    );
}

#[tokio::test]
async fn chat_failure_propagates() {
    let retriever = StubRetriever { hits: two_document_corpus(), asked_k: Mutex::new(None) };
    let chat = StubChat { reply: Err("401 unauthorized".to_string()), last_prompt: Mutex::new(None) };
    let pipeline = QaPipeline::new(retriever, chat, 4);

    let err = pipeline.ask("q").await.unwrap_err();
    assert!(err.to_string().contains("401"));
}
