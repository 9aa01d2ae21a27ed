//! Shared setup for the `paperqa` binaries.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use paperqa_core::config::AppConfig;

/// Diagnostics go to stderr so stdout carries only progress and answers.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => AppConfig::load_from(p),
        None => AppConfig::load(),
    }
    .map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    Ok(config)
}

/// Overrides `data.pdf_dir` when a directory is given on the command line.
pub fn apply_data_dir(config: &mut AppConfig, data_dir: Option<PathBuf>) {
    if let Some(dir) = data_dir {
        config.data.pdf_dir = dir.to_string_lossy().to_string();
    }
}

/// Overrides `retrieval.k`; the result goes through the same validation as
/// the config file, so `--k 0` is rejected.
pub fn apply_k(config: &mut AppConfig, k: Option<usize>) -> Result<()> {
    if let Some(k) = k {
        config.retrieval.k = k;
        config.validate()?;
    }
    Ok(())
}
