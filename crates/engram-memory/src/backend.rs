use std::path::PathBuf;
use std::str::FromStr;

use crate::any::AnyMemory;
use crate::error::MemoryError;
use crate::json_file::JsonFileMemory;
use crate::no_memory::NoMemory;

const SUPPORTED_BACKENDS: &[&str] = &["json_file", "no_memory"];

const RETIRED_BACKENDS: &[(&str, &str)] = &[
    (
        "pinecone",
        "the Pinecone backend became incompatible with the chunked memory format and was removed",
    ),
    (
        "redis",
        "the Redis backend became incompatible with the chunked memory format and was removed",
    ),
    (
        "weaviate",
        "the Weaviate backend became incompatible with the chunked memory format and was removed",
    ),
    (
        "milvus",
        "the Milvus backend became incompatible with the chunked memory format and was removed",
    ),
];

/// Names of the backends that can be selected.
#[must_use]
pub fn supported_backends() -> &'static [&'static str] {
    SUPPORTED_BACKENDS
}

/// Names of backends that were once supported and are now rejected.
pub fn retired_backends() -> impl Iterator<Item = &'static str> {
    RETIRED_BACKENDS.iter().map(|(name, _)| *name)
}

/// Active memory backend kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Local JSON file. Used when configuration does not name a backend.
    #[default]
    JsonFile,
    NoMemory,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JsonFile => "json_file",
            Self::NoMemory => "no_memory",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = MemoryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "json_file" | "local" | "file" | "file-backed" => Ok(Self::JsonFile),
            "no_memory" | "none" => Ok(Self::NoMemory),
            other => match RETIRED_BACKENDS.iter().find(|(retired, _)| *retired == other) {
                Some((backend, reason)) => Err(MemoryError::BackendRetired {
                    backend: (*backend).to_owned(),
                    reason,
                }),
                None => Err(MemoryError::UnknownBackend(name.to_owned())),
            },
        }
    }
}

/// What a backend needs to be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Backing file of the JSON file backend.
    pub path: PathBuf,
    /// Declared embedding length; inferred from stored data when `None`.
    pub dimension: Option<usize>,
}

/// Resolve `backend` and construct the matching provider.
///
/// The name is resolved before anything is constructed, so retired and
/// unknown names never touch the filesystem.
///
/// # Errors
///
/// Returns `BackendRetired` or `UnknownBackend` for names that cannot be
/// used, and any error of [`JsonFileMemory::open`] for the file backend.
pub fn select(backend: &str, config: &ProviderConfig) -> Result<AnyMemory, MemoryError> {
    let kind = backend.parse::<BackendKind>()?;
    let memory = build(kind, config)?;
    tracing::info!(backend = %kind, "memory backend selected");
    Ok(memory)
}

/// Construct the provider for an already-resolved `kind`.
///
/// # Errors
///
/// Returns any error of [`JsonFileMemory::open`] for the file backend.
pub fn build(kind: BackendKind, config: &ProviderConfig) -> Result<AnyMemory, MemoryError> {
    match kind {
        BackendKind::JsonFile => {
            JsonFileMemory::open(config.path.clone(), config.dimension).map(AnyMemory::from)
        }
        BackendKind::NoMemory => Ok(AnyMemory::from(NoMemory)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    fn config(dir: &tempfile::TempDir) -> ProviderConfig {
        ProviderConfig {
            path: dir.path().join("memory.json"),
            dimension: Some(3),
        }
    }

    #[test]
    fn parses_aliases() {
        for name in ["json_file", "local", "file", "file-backed", " JSON_FILE "] {
            assert_eq!(name.parse::<BackendKind>().unwrap(), BackendKind::JsonFile);
        }
        for name in ["no_memory", "none", "None"] {
            assert_eq!(name.parse::<BackendKind>().unwrap(), BackendKind::NoMemory);
        }
    }

    #[test]
    fn default_kind_is_json_file() {
        assert_eq!(BackendKind::default(), BackendKind::JsonFile);
    }

    #[test]
    fn display_round_trips() {
        for kind in [BackendKind::JsonFile, BackendKind::NoMemory] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn supported_backends_parse() {
        for name in supported_backends() {
            assert!(name.parse::<BackendKind>().is_ok());
        }
    }

    #[test]
    fn retired_backends_fail_with_reason() {
        for name in retired_backends() {
            let err = name.parse::<BackendKind>().unwrap_err();
            let MemoryError::BackendRetired { backend, reason } = err else {
                panic!("expected BackendRetired for {name}");
            };
            assert_eq!(backend, name);
            assert!(!reason.is_empty());
        }
    }

    #[test]
    fn unknown_backend_names_offending_value() {
        let err = "sqlite".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, MemoryError::UnknownBackend(ref n) if n == "sqlite"));
    }

    #[test]
    fn select_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let memory = select("local", &config(&dir)).unwrap();
        assert_eq!(memory.name(), "json_file");
        assert_eq!(memory.dimension(), Some(3));
    }

    #[test]
    fn select_no_memory() {
        let dir = tempfile::tempdir().unwrap();
        let memory = select("no_memory", &config(&dir)).unwrap();
        assert!(matches!(memory, AnyMemory::NoMemory(_)));
    }

    #[test]
    fn retired_select_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ProviderConfig {
            path: dir.path().join("sub/memory.json"),
            dimension: None,
        };
        let err = select("pinecone", &cfg).unwrap_err();
        assert!(matches!(err, MemoryError::BackendRetired { .. }));
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn select_surfaces_open_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "not json").unwrap();
        let cfg = ProviderConfig {
            path,
            dimension: None,
        };
        assert!(matches!(
            select("json_file", &cfg),
            Err(MemoryError::Corrupt { .. })
        ));
    }
}
