use anyhow::Result;
use tracing::{debug, info};

use paperqa_core::traits::{ChatModel, Retriever};

use crate::answer::Answer;
use crate::prompt::{build_prompt, format_context};

/// retrieve -> prompt -> complete. Errors from either side propagate as-is.
pub struct QaPipeline<R, C> {
    retriever: R,
    chat: C,
    k: usize,
}

impl<R: Retriever, C: ChatModel> QaPipeline<R, C> {
    pub fn new(retriever: R, chat: C, k: usize) -> Self {
        Self { retriever, chat, k }
    }

    pub fn retriever(&self) -> &R { &self.retriever }

    pub fn chat(&self) -> &C { &self.chat }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let chunks = self.retriever.retrieve(question, self.k).await?;
        info!(k = self.k, retrieved = chunks.len(), "retrieved context");
        let prompt = build_prompt(&format_context(&chunks), question);
        debug!(prompt_chars = prompt.len(), "sending prompt");
        let text = self.chat.complete(&prompt).await?;
        Ok(Answer::from_chunks(text, &chunks))
    }
}
