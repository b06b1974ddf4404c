mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};
use engram_memory::BackendKind;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject values no backend can run with.
    ///
    /// The backend name itself is resolved later by the selector, which owns
    /// the unknown and retired errors.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.memory.embedding_dim == Some(0) {
            bail!("memory.embedding_dim must be greater than 0");
        }
        if self.splitter.chunk_size == 0 {
            bail!("splitter.chunk_size must be greater than 0");
        }
        if self.splitter.chunk_overlap >= self.splitter.chunk_size {
            bail!(
                "splitter.chunk_overlap ({}) must be less than splitter.chunk_size ({})",
                self.splitter.chunk_overlap,
                self.splitter.chunk_size
            );
        }
        if self.embedding.timeout_secs == 0 {
            bail!("embedding.timeout_secs must be greater than 0");
        }
        if self.memory.backend.parse::<BackendKind>().ok() == Some(BackendKind::JsonFile)
            && self.memory.path.trim().is_empty()
        {
            bail!("memory.path must be set for the json_file backend");
        }
        Ok(())
    }
}
