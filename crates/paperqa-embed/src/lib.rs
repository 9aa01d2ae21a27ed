//! paperqa-embed
//!
//! Embedding providers behind the `paperqa_core::traits::Embedder` seam:
//! a hosted OpenAI-compatible endpoint, a local XLM-RoBERTa model run with
//! candle, and a deterministic fake for tests.

use anyhow::{anyhow, Result};
use paperqa_core::config::{EmbeddingConfig, EmbeddingProvider};
use paperqa_core::traits::Embedder;

pub mod device;
pub mod error;
pub mod fake;
pub mod local;
pub mod pool;
pub mod remote;
pub mod tokenize;

pub use error::EmbedError;
pub use fake::FakeEmbedder;
pub use local::LocalEmbedder;
pub use pool::masked_mean_l2;
pub use remote::RemoteEmbedder;

/// Builds the embedder selected by `embedding.provider`.
pub fn get_default_embedder(cfg: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match cfg.provider {
        EmbeddingProvider::Fake => {
            println!("🧪 Using FakeEmbedder (dim {})", cfg.dim);
            Ok(Box::new(FakeEmbedder::new(cfg.dim)))
        }
        EmbeddingProvider::Remote => Ok(Box::new(RemoteEmbedder::new(cfg)?)),
        EmbeddingProvider::Local => {
            let dir = cfg
                .model_dir
                .as_deref()
                .map(paperqa_core::config::expand_path)
                .ok_or_else(|| anyhow!("embedding.model_dir is required for the local provider"))?;
            Ok(Box::new(LocalEmbedder::load(&dir, cfg.max_len)?))
        }
    }
}
