use std::sync::Arc;

use crate::embed::Embedder;
use crate::error::MemoryError;
use crate::item::MemoryItem;
use crate::relevance::MemoryItemRelevance;

/// Item and chunk totals of a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub items: usize,
    pub chunks: usize,
}

/// Contract shared by every memory backend.
///
/// Handles returned by [`add`](MemoryProvider::add) are positions in
/// insertion order. Stores are append-only; [`clear`](MemoryProvider::clear)
/// is the only way to drop items. Durable providers persist before `add` and
/// `clear` return.
pub trait MemoryProvider: Send {
    /// Append `item`, returning its positional handle.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the item's vectors do not have the
    /// provider's dimensionality, or `Storage` if persisting fails. The store
    /// is unchanged on error.
    fn add(&mut self, item: MemoryItem) -> Result<usize, MemoryError>;

    /// # Errors
    ///
    /// Returns `NotFound` if `index` does not name a live item.
    fn get(&self, index: usize) -> Result<Arc<MemoryItem>, MemoryError>;

    /// Up to `k` items ranked by descending best score, earlier items first on
    /// ties. `k == 0` yields an empty vec.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `query` has the wrong length.
    fn get_relevant(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<MemoryItemRelevance>, MemoryError>;

    /// Drop every item. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if persisting the empty store fails; the items are
    /// kept in that case.
    fn clear(&mut self) -> Result<(), MemoryError>;

    fn count(&self) -> usize;

    fn name(&self) -> &'static str;

    /// The fixed embedding length, once declared or learned.
    fn dimension(&self) -> Option<usize>;

    /// Snapshot of the live items in insertion order.
    fn items(&self) -> Vec<Arc<MemoryItem>>;

    /// The single most relevant item, if any.
    ///
    /// # Errors
    ///
    /// Same as [`get_relevant`](MemoryProvider::get_relevant).
    fn get_most_relevant(
        &self,
        query: &[f32],
    ) -> Result<Option<MemoryItemRelevance>, MemoryError> {
        Ok(self.get_relevant(query, 1)?.into_iter().next())
    }

    /// Embed `text` and rank against it.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingUnavailable` if the embedder fails, otherwise the
    /// errors of [`get_relevant`](MemoryProvider::get_relevant).
    fn get_relevant_for_text(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<MemoryItemRelevance>, MemoryError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query = embedder
            .embed(text)
            .map_err(MemoryError::EmbeddingUnavailable)?;
        self.get_relevant(&query, k)
    }

    fn stats(&self) -> MemoryStats {
        let items = self.items();
        MemoryStats {
            items: items.len(),
            chunks: items.iter().map(|i| i.chunks().len()).sum(),
        }
    }
}

/// Check that `actual` matches a known dimensionality.
pub(crate) fn check_dimension(expected: Option<usize>, actual: usize) -> Result<(), MemoryError> {
    match expected {
        Some(expected) if expected != actual => {
            Err(MemoryError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}
