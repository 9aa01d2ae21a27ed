use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::pdf::{PdfExtractor, TextExtractor};
use crate::splitter::RecursiveSplitter;
use crate::types::{Chunk, Document};

/// Turns a directory of PDFs into chunks: list -> extract -> split.
pub struct DataProcessor<E: TextExtractor = PdfExtractor> {
    extractor: E,
    splitter: RecursiveSplitter,
}

impl Default for DataProcessor {
    fn default() -> Self { Self::new(RecursiveSplitter::default()) }
}

impl DataProcessor {
    pub fn new(splitter: RecursiveSplitter) -> Self {
        Self { extractor: PdfExtractor, splitter }
    }
}

impl<E: TextExtractor> DataProcessor<E> {
    pub fn with_extractor(extractor: E, splitter: RecursiveSplitter) -> Self {
        Self { extractor, splitter }
    }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> {
        if !data_dir.is_dir() {
            return Err(Error::MissingDir(data_dir.to_path_buf()));
        }
        let files = list_pdf_files(data_dir);
        if files.is_empty() {
            println!("No .pdf files found under {}.", data_dir.display());
            return Ok(vec![]);
        }
        let docs: Vec<Document> = self
            .prepare_documents(&files)
            .into_iter()
            .map(|d| {
                let id = relative_doc_id(data_dir, Path::new(&d.source_path));
                d.with_doc_id(id)
            })
            .collect();
        let chunks = self.splitter.split_documents(&docs);
        println!(
            "Processed {} files ({} with text) into {} chunks",
            files.len(),
            docs.len(),
            chunks.len()
        );
        Ok(chunks)
    }

    /// One [`Document`] per path with non-empty text, in input order.
    pub fn prepare_documents(&self, paths: &[PathBuf]) -> Vec<Document> {
        let mut docs = Vec::with_capacity(paths.len());
        for (file_index, path) in paths.iter().enumerate() {
            println!("Processing file {}/{}: {}", file_index + 1, paths.len(), path.display());
            let text = self.extractor.extract(path);
            if text.trim().is_empty() {
                debug!(path = %path.display(), "no extractable text, skipping");
                continue;
            }
            docs.push(Document::new(text, path.to_string_lossy()));
        }
        docs
    }
}

/// All `.pdf` files under `root` (any extension case), sorted by path.
pub fn list_pdf_files(root: &Path) -> Vec<PathBuf> {
    let mut pdf_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")))
        .collect();
    pdf_files.sort();
    pdf_files
}

/// `path` below `root` without its extension, `/`-separated: `2017/attention`.
pub fn relative_doc_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path).with_extension("");
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
