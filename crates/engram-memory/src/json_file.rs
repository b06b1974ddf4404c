use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::MemoryError;
use crate::item::MemoryItem;
use crate::provider::{MemoryProvider, check_dimension};
use crate::relevance::{MemoryItemRelevance, rank};

/// Memory provider persisted as one JSON array of items.
///
/// The whole file is loaded on open and rewritten on every `add` and `clear`
/// through a temporary sibling file renamed over the target, so a crash
/// mid-write leaves either the old or the new contents. File and directory
/// are both fsynced before a write returns. One process owns the
/// file; concurrent external writers are not detected.
pub struct JsonFileMemory {
    path: PathBuf,
    dimension: Option<usize>,
    items: Vec<Arc<MemoryItem>>,
}

impl std::fmt::Debug for JsonFileMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileMemory")
            .field("path", &self.path)
            .field("dimension", &self.dimension)
            .field("items", &self.items.len())
            .finish()
    }
}

impl JsonFileMemory {
    /// Open the store at `path`, loading any items already written there.
    ///
    /// `dimension` declares the embedding length up front; when `None` it is
    /// inferred from the first stored item, or from the first item added to an
    /// empty store. A missing or blank file is an empty store and is created
    /// on the first write.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a declared dimension of zero, `Storage` if
    /// the file cannot be read, `Corrupt` if it is not a
    /// JSON array of items, `InvalidItem` if an item is malformed, and
    /// `DimensionMismatch` if any item disagrees with the declared or inferred
    /// dimensionality. A store with mixed dimensions is never partially
    /// loaded.
    pub fn open(path: impl Into<PathBuf>, dimension: Option<usize>) -> Result<Self, MemoryError> {
        let path = path.into();
        if dimension == Some(0) {
            return Err(MemoryError::InvalidConfig(
                "embedding dimension must be positive".into(),
            ));
        }

        let loaded = load_items(&path)?;
        let mut dimension = dimension;
        for item in &loaded {
            item.validate()?;
            check_dimension(dimension, item.dimension())?;
            if dimension.is_none() {
                dimension = Some(item.dimension());
            }
        }

        tracing::debug!(
            path = %path.display(),
            items = loaded.len(),
            ?dimension,
            "opened JSON file memory"
        );

        Ok(Self {
            path,
            dimension,
            items: loaded.into_iter().map(Arc::new).collect(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &[Arc<MemoryItem>]) -> Result<(), MemoryError> {
        let records: Vec<&MemoryItem> = items.iter().map(|item| &**item).collect();
        let bytes = serde_json::to_vec(&records)?;
        write_atomic(&self.path, &bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            items = items.len(),
            bytes = bytes.len(),
            "persisted JSON file memory"
        );
        Ok(())
    }
}

fn load_items(path: &Path) -> Result<Vec<MemoryItem>, MemoryError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(MemoryError::storage(path, e)),
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|source| MemoryError::Corrupt {
        path: path.to_owned(),
        source,
    })
}

/// Replace `path` with `bytes` via a synced temporary file in the same
/// directory, so the rename stays on one filesystem. The directory is synced
/// after the rename so the new entry survives power loss.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MemoryError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| MemoryError::storage(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| MemoryError::storage(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| MemoryError::storage(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| MemoryError::storage(path, e.error))?;
    sync_dir(dir)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), MemoryError> {
    std::fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| MemoryError::storage(dir, e))
}

// Directory handles cannot be fsynced on this platform.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), MemoryError> {
    Ok(())
}

impl MemoryProvider for JsonFileMemory {
    fn add(&mut self, item: MemoryItem) -> Result<usize, MemoryError> {
        item.validate()?;
        check_dimension(self.dimension, item.dimension())?;

        let adopted = self.dimension.is_none();
        self.dimension = Some(item.dimension());
        self.items.push(Arc::new(item));

        if let Err(e) = self.persist(&self.items) {
            self.items.pop();
            if adopted {
                self.dimension = None;
            }
            tracing::warn!(path = %self.path.display(), "memory add rolled back: {e}");
            return Err(e);
        }
        Ok(self.items.len() - 1)
    }

    fn get(&self, index: usize) -> Result<Arc<MemoryItem>, MemoryError> {
        self.items
            .get(index)
            .cloned()
            .ok_or(MemoryError::NotFound(index))
    }

    fn get_relevant(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<MemoryItemRelevance>, MemoryError> {
        check_dimension(self.dimension, query.len())?;
        Ok(rank(&self.items, query, k))
    }

    fn clear(&mut self) -> Result<(), MemoryError> {
        self.persist(&[])?;
        self.items.clear();
        Ok(())
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn name(&self) -> &'static str {
        "json_file"
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn items(&self) -> Vec<Arc<MemoryItem>> {
        self.items.clone()
    }
}
