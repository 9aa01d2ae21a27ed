//! PDF text extraction.
//!
//! Extraction never fails loudly: an unreadable file yields an empty string and
//! a page that cannot be decoded is skipped, so callers only need to filter
//! empty results.

use std::path::Path;

use tracing::{debug, warn};

/// Produces the plain text of a file. Implemented by [`PdfExtractor`] and by
/// stubs in tests.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> String;
}

/// `lopdf`-backed extractor: pages in page order, joined with `\n`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> String {
        extract_pdf_text(path)
    }
}

pub fn extract_pdf_text(path: &Path) -> String {
    let doc = match lopdf::Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open PDF");
            return String::new();
        }
    };
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut texts = Vec::with_capacity(pages.len());
    for page in pages {
        match doc.extract_text(&[page]) {
            Ok(text) => texts.push(text),
            Err(e) => debug!(path = %path.display(), page, error = %e, "skipping page"),
        }
    }
    texts.join("\n")
}
