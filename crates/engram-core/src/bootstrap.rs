//! Startup wiring: config resolution, provider selection, splitter and embedder construction.

use std::path::{Path, PathBuf};

use anyhow::Context;
use engram_memory::splitter::TextSplitter;
use engram_memory::{AnyMemory, MemoryProvider, select};

use crate::config::Config;
use crate::embed::OllamaEmbedder;

/// Priority: `--config` argument > `ENGRAM_CONFIG` env > `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("ENGRAM_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

/// Load and validate the config at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or holds invalid values.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Build the memory provider named by `memory.backend`.
///
/// # Errors
///
/// Fails for unknown or retired backend names, and when the backing store
/// cannot be opened.
pub fn create_memory(config: &Config) -> anyhow::Result<AnyMemory> {
    let memory = select(&config.memory.backend, &config.memory.provider_config())
        .with_context(|| {
            format!(
                "failed to initialize memory backend '{}'",
                config.memory.backend
            )
        })?;
    tracing::debug!(
        backend = memory.name(),
        items = memory.count(),
        dimension = ?memory.dimension(),
        "memory ready"
    );
    Ok(memory)
}

#[must_use]
pub fn create_splitter(config: &Config) -> TextSplitter {
    TextSplitter::new(config.splitter.clone())
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn create_embedder(config: &Config) -> anyhow::Result<OllamaEmbedder> {
    OllamaEmbedder::new(&config.embedding).context("failed to create embedding client")
}
