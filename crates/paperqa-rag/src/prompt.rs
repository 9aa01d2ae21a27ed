use paperqa_core::ScoredChunk;

pub const PROMPT_TEMPLATE: &str = "Answer the question based only on the following context:

{context}

Question: {question}";

/// Chunk texts in retrieval order, separated by a blank line.
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    chunks.iter().map(|c| c.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// Fills [`PROMPT_TEMPLATE`]. The question slot is only looked up after the
/// context slot, so braces inside the context stay literal.
pub fn build_prompt(context: &str, question: &str) -> String {
    let (head, tail) = PROMPT_TEMPLATE.split_once("{context}").unwrap_or((PROMPT_TEMPLATE, ""));
    format!("{head}{context}{}", tail.replacen("{question}", question, 1))
}
