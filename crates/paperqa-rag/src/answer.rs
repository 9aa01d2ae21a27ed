use std::fmt;

use serde::Serialize;

use paperqa_core::ScoredChunk;

/// Generated answer plus the distinct source paths of the chunks behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}

impl Answer {
    /// Sources keep retrieval order; repeated paths are listed once.
    pub fn from_chunks(text: impl Into<String>, chunks: &[ScoredChunk]) -> Self {
        let mut sources: Vec<String> = Vec::new();
        for c in chunks {
            if !sources.contains(&c.chunk.source_path) {
                sources.push(c.chunk.source_path.clone());
            }
        }
        Self { text: text.into(), sources }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.text)?;
        writeln!(f)?;
        write!(f, "Sources:")?;
        for s in &self.sources {
            write!(f, "\n- {s}")?;
        }
        Ok(())
    }
}
