use std::path::PathBuf;

use crate::embed::EmbedError;

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no memory item at index {0}")]
    NotFound(usize),

    #[error("unknown memory backend '{0}', check your config")]
    UnknownBackend(String),

    #[error("memory backend '{backend}' is retired: {reason}")]
    BackendRetired {
        backend: String,
        reason: &'static str,
    },

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[source] EmbedError),

    #[error("storage I/O failed for {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("memory file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid memory item: {0}")]
    InvalidItem(String),

    #[error("invalid memory configuration: {0}")]
    InvalidConfig(String),

    #[error("memory lock poisoned")]
    Poisoned,
}

impl MemoryError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
