//! Recursive character splitter.
//!
//! Tries paragraph, line and word boundaries in that order before cutting
//! between characters. Pieces keep their leading separator, are merged greedily
//! into windows of at most `chunk_size` chars, and each new window starts with
//! at most `chunk_overlap` chars carried over from the end of the previous one.

use std::collections::VecDeque;

use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".into()));
        }
        if chunk_overlap > chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) is larger than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap, ..Self::default() })
    }

    #[must_use]
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }

    pub fn chunk_overlap(&self) -> usize { self.chunk_overlap }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Splits every document, keeping document order and each chunk's source path.
    pub fn split_documents(&self, docs: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for doc in docs {
            let doc_id = &doc.doc_id;
            let texts = self.split_text(&doc.text);
            let total_chunks = texts.len();
            chunks.extend(texts.into_iter().enumerate().map(|(chunk_index, text)| Chunk {
                id: format!("{doc_id}:{chunk_index}"),
                text,
                source_path: doc.source_path.clone(),
                chunk_index,
                total_chunks,
            }));
        }
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);
        let mut out = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                out.extend(self.merge_pieces(&pending));
                pending.clear();
            }
            if remaining.is_empty() {
                out.extend(trimmed(piece));
            } else {
                out.extend(self.split_recursive(piece, remaining));
            }
        }
        if !pending.is_empty() {
            out.extend(self.merge_pieces(&pending));
        }
        out
    }

    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;
        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(total, chunk_size = self.chunk_size, "created a chunk longer than chunk_size");
                }
                if !window.is_empty() {
                    merged.extend(join_window(&window));
                    // keep at most `chunk_overlap` chars as the head of the next window
                    while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                        match window.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }
        merged.extend(join_window(&window));
        merged
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (sep.as_str(), &[]);
        }
        if text.contains(sep.as_str()) {
            return (sep.as_str(), &separators[i + 1..]);
        }
    }
    (separators.last().map_or("", String::as_str), &[])
}

/// Splits before every occurrence of `separator`, so each piece after the first
/// starts with the separator. An empty separator yields single chars.
fn split_keep_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    trimmed(&joined)
}

fn trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

fn char_len(s: &str) -> usize { s.chars().count() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_separator_at_piece_start() {
        assert_eq!(split_keep_separator("a b  c", " "), vec!["a", " b", " ", " c"]);
        assert_eq!(split_keep_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
        assert_eq!(split_keep_separator("héé", ""), vec!["h", "é", "é"]);
    }

    #[test]
    fn picks_first_present_separator() {
        let seps: Vec<String> = DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect();
        let (sep, rest) = pick_separator("one line only", &seps);
        assert_eq!(sep, " ");
        assert_eq!(rest.len(), 1);
        let (sep, rest) = pick_separator("nospaces", &seps);
        assert_eq!(sep, "");
        assert!(rest.is_empty());
    }
}
