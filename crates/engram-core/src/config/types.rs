use std::path::PathBuf;

use engram_memory::backend::{BackendKind, ProviderConfig};
use engram_memory::splitter::SplitterConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
}

fn default_memory_backend() -> String {
    BackendKind::default().as_str().into()
}

fn default_memory_path() -> String {
    "./data/engram.json".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Backend name, resolved by the selector at startup.
    #[serde(default = "default_memory_backend")]
    pub backend: String,
    #[serde(default = "default_memory_path")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_dim: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: default_memory_path(),
            embedding_dim: None,
        }
    }
}

impl MemoryConfig {
    #[must_use]
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            path: PathBuf::from(&self.path),
            dimension: self.embedding_dim,
        }
    }
}

fn default_embedding_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}

fn default_embedding_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}
