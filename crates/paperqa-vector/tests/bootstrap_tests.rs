use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use paperqa_core::traits::{Embedder, Retriever};
use paperqa_core::Chunk;
use paperqa_embed::FakeEmbedder;
use paperqa_vector::{bootstrap, is_populated, remove_index, VectorRetriever};

/// Counts every text it is asked to embed; optionally fails from the n-th call on.
struct CountingEmbedder {
    inner: FakeEmbedder,
    texts: AtomicUsize,
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self::with_dim(32)
    }

    fn with_dim(dim: usize) -> Self {
        Self { inner: FakeEmbedder::new(dim), texts: AtomicUsize::new(0), calls: AtomicUsize::new(0), fail_on_call: None }
    }

    fn failing_on_call(n: usize) -> Self {
        Self { fail_on_call: Some(n), ..Self::new() }
    }

    fn embedded(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }

    fn dim(&self) -> usize { self.inner.dim() }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call.is_some_and(|n| call >= n) {
            anyhow::bail!("embedding endpoint unavailable");
        }
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

fn chunk(stem: &str, i: usize, total: usize, text: &str) -> Chunk {
    Chunk {
        id: format!("{stem}:{i}"),
        text: text.to_string(),
        source_path: format!("/papers/{stem}.pdf"),
        chunk_index: i,
        total_chunks: total,
    }
}

fn corpus() -> Vec<Chunk> {
    vec![
        chunk("attention", 0, 2, "Scaled dot product attention over queries keys and values"),
        chunk("attention", 1, 2, "Multi head attention runs several attention layers in parallel"),
        chunk("bert", 0, 1, "Bidirectional encoder pretraining with masked language modelling"),
        chunk("rag", 0, 1, "Retrieval augmented generation combines a retriever with a generator"),
        chunk("resnet", 0, 1, "Residual connections make very deep convolutional networks trainable"),
    ]
}

#[tokio::test]
async fn cold_start_embeds_each_chunk_once_and_persists() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    let embedder = CountingEmbedder::new();

    let store = bootstrap(&dir, "chunks", &embedder, 2, || Ok(corpus())).await.expect("bootstrap");

    assert_eq!(embedder.embedded(), corpus().len());
    assert_eq!(store.count_rows().await.unwrap(), corpus().len());
    assert_eq!(store.embedder_id().await.unwrap().as_deref(), Some("fake:xxhash64:d32"));
    assert!(is_populated(&dir));
}

#[tokio::test]
async fn populated_directory_loads_without_embedding() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    let first = CountingEmbedder::new();
    bootstrap(&dir, "chunks", &first, 64, || Ok(corpus())).await.expect("build");

    let second = CountingEmbedder::new();
    let loader_ran = AtomicUsize::new(0);
    let store = bootstrap(&dir, "chunks", &second, 64, || {
        loader_ran.fetch_add(1, Ordering::SeqCst);
        Ok(corpus())
    })
    .await
    .expect("load");

    assert_eq!(second.embedded(), 0);
    assert_eq!(loader_ran.load(Ordering::SeqCst), 0);
    assert_eq!(store.count_rows().await.unwrap(), corpus().len());
}

#[tokio::test]
async fn empty_existing_directory_is_a_cold_start() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    std::fs::create_dir_all(&dir).unwrap();
    assert!(!is_populated(&dir));

    let embedder = CountingEmbedder::new();
    bootstrap(&dir, "chunks", &embedder, 64, || Ok(corpus())).await.expect("bootstrap");

    assert_eq!(embedder.embedded(), corpus().len());
}

#[tokio::test]
async fn cold_start_with_no_chunks_fails_and_leaves_no_index() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    let embedder = CountingEmbedder::new();

    let result = bootstrap(&dir, "chunks", &embedder, 64, || Ok(Vec::new())).await;

    assert!(result.is_err());
    assert!(!is_populated(&dir));
    assert_eq!(embedder.embedded(), 0);
}

#[tokio::test]
async fn remove_index_forces_rebuild() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    bootstrap(&dir, "chunks", &CountingEmbedder::new(), 64, || Ok(corpus())).await.expect("build");

    remove_index(&dir, "chunks", &tmp.path().join("papers")).expect("remove");
    assert!(!dir.exists());

    let embedder = CountingEmbedder::new();
    bootstrap(&dir, "chunks", &embedder, 64, || Ok(corpus()[..2].to_vec())).await.expect("rebuild");
    assert_eq!(embedder.embedded(), 2);
}

#[tokio::test]
async fn retriever_returns_k_nearest_with_provenance() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(256));
    let store = bootstrap(&dir, "chunks", embedder.as_ref(), 64, || Ok(corpus())).await.expect("bootstrap");
    let retriever = VectorRetriever::new(store, embedder);

    let hits = retriever.retrieve("retrieval augmented generation", 3).await.expect("retrieve");

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].chunk.id, "rag:0");
    assert_eq!(hits[0].chunk.source_path, "/papers/rag.pdf");
    assert!(hits[0].chunk.text.starts_with("Retrieval augmented"));
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn remove_index_refuses_directory_holding_the_corpus() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("data");
    let papers = dir.join("papers");
    std::fs::create_dir_all(&papers).unwrap();
    std::fs::write(papers.join("attention.pdf"), b"%PDF").unwrap();

    assert!(remove_index(&dir, "chunks", &papers).is_err());
    assert!(papers.join("attention.pdf").exists());
}

#[tokio::test]
async fn remove_index_refuses_directory_without_an_index() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("notes");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("todo.txt"), b"keep me").unwrap();

    assert!(remove_index(&dir, "chunks", &tmp.path().join("papers")).is_err());
    assert!(dir.join("todo.txt").exists());

    remove_index(&tmp.path().join("absent"), "chunks", &tmp.path().join("papers")).expect("absent dir is fine");
}

#[tokio::test]
async fn failed_build_leaves_no_index_behind() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    let chunks = corpus()[..4].to_vec();
    let embedder = CountingEmbedder::failing_on_call(2);

    let result = bootstrap(&dir, "chunks", &embedder, 2, || Ok(chunks)).await;

    assert!(result.is_err());
    assert_eq!(embedder.embedded(), 2, "first batch was written before the failure");
    assert!(!is_populated(&dir));

    let retry = CountingEmbedder::new();
    bootstrap(&dir, "chunks", &retry, 2, || Ok(corpus())).await.expect("cold start again");
    assert_eq!(retry.embedded(), corpus().len());
}

#[tokio::test]
async fn load_with_different_embedder_still_serves_index() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lancedb");
    bootstrap(&dir, "chunks", &CountingEmbedder::with_dim(32), 64, || Ok(corpus())).await.expect("build");

    let other = CountingEmbedder::with_dim(64);
    let store = bootstrap(&dir, "chunks", &other, 64, || Ok(Vec::new())).await.expect("load");

    assert_eq!(other.embedded(), 0);
    assert_eq!(store.count_rows().await.unwrap(), corpus().len());
    assert_eq!(store.embedder_id().await.unwrap().as_deref(), Some("fake:xxhash64:d32"));
    assert_ne!(other.embedder_id(), "fake:xxhash64:d32");
}
