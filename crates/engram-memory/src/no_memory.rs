use std::sync::Arc;

use crate::error::MemoryError;
use crate::item::MemoryItem;
use crate::provider::MemoryProvider;
use crate::relevance::MemoryItemRelevance;

/// Provider used when memory is disabled: accepts everything, keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemory;

impl MemoryProvider for NoMemory {
    fn add(&mut self, _item: MemoryItem) -> Result<usize, MemoryError> {
        Ok(0)
    }

    fn get(&self, index: usize) -> Result<Arc<MemoryItem>, MemoryError> {
        Err(MemoryError::NotFound(index))
    }

    fn get_relevant(
        &self,
        _query: &[f32],
        _k: usize,
    ) -> Result<Vec<MemoryItemRelevance>, MemoryError> {
        Ok(Vec::new())
    }

    fn clear(&mut self) -> Result<(), MemoryError> {
        Ok(())
    }

    fn count(&self) -> usize {
        0
    }

    fn name(&self) -> &'static str {
        "no_memory"
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    fn items(&self) -> Vec<Arc<MemoryItem>> {
        Vec::new()
    }
}
