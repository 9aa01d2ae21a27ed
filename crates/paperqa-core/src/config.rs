//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! (selected by `RUST_ENV`) and `APP_*` env vars (nested with `__`, e.g.
//! `APP_LLM__MODEL`). The result is one [`AppConfig`] built at startup and
//! passed down explicitly.

use std::env;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Credential fallback shared by the chat and embedding endpoints.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub pdf_dir: String,
    pub index_dir: String,
    pub table: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            pdf_dir: "papers".to_string(),
            index_dir: "index/lancedb".to_string(),
            table: "chunks".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// OpenAI-compatible `/embeddings` endpoint.
    Remote,
    /// XLM-RoBERTa family model (e.g. BGE-M3) run locally with candle.
    Local,
    /// Deterministic feature hashing, for tests and offline development.
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
    pub dim: usize,
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Remote,
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            batch_size: 64,
            dim: 1536,
            model_dir: None,
            max_len: 256,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self { Self { k: 4 } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

impl AppConfig {
    /// Loads `config.toml` (and its env overlay) from the working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Loads `file` plus its `RUST_ENV` sibling, e.g. `config.dev.toml`.
    /// Relative paths in the `data` section resolve against the file's directory.
    pub fn load_from(file: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let base = file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let mut config: Self = Self::figment(file, &env_name).extract()?;
        config.fill_credentials_from_env();
        config.data.pdf_dir = resolve_with_base(base, &config.data.pdf_dir).to_string_lossy().to_string();
        config.data.index_dir = resolve_with_base(base, &config.data.index_dir).to_string_lossy().to_string();
        config.validate()?;
        Ok(config)
    }

    fn figment(file: &Path, env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(file));
        let overlay = match env_name {
            "dev" | "development" => Some("dev"),
            "prod" | "production" => Some("prod"),
            "test" | "testing" => Some("test"),
            _ => None,
        };
        if let Some(suffix) = overlay {
            figment = figment.merge(Toml::file(file.with_extension(format!("{suffix}.toml"))));
        }
        figment.merge(Env::prefixed("APP_").split("__"))
    }

    fn fill_credentials_from_env(&mut self) {
        let fallback = env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if self.llm.api_key.is_none() {
            self.llm.api_key.clone_from(&fallback);
        }
        if self.embedding.api_key.is_none() {
            self.embedding.api_key = self.llm.api_key.clone().or(fallback);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be > 0".into()));
        }
        if self.chunking.chunk_overlap > self.chunking.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must not exceed chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.k == 0 {
            return Err(Error::InvalidConfig("retrieval.k must be > 0".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be > 0".into()));
        }
        Ok(())
    }

    pub fn pdf_dir(&self) -> PathBuf { PathBuf::from(&self.data.pdf_dir) }

    pub fn index_dir(&self) -> PathBuf { PathBuf::from(&self.data.index_dir) }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
