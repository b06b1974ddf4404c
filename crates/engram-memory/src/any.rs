use std::sync::Arc;

use crate::error::MemoryError;
use crate::item::MemoryItem;
use crate::json_file::JsonFileMemory;
use crate::no_memory::NoMemory;
use crate::provider::MemoryProvider;
use crate::relevance::MemoryItemRelevance;

/// Generates a match over all `AnyMemory` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_memory {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyMemory::JsonFile($p) => $expr,
            AnyMemory::NoMemory($p) => $expr,
        }
    };
}

/// The closed set of memory backends a host can run with.
#[derive(Debug)]
pub enum AnyMemory {
    JsonFile(JsonFileMemory),
    NoMemory(NoMemory),
}

impl From<JsonFileMemory> for AnyMemory {
    fn from(memory: JsonFileMemory) -> Self {
        Self::JsonFile(memory)
    }
}

impl From<NoMemory> for AnyMemory {
    fn from(memory: NoMemory) -> Self {
        Self::NoMemory(memory)
    }
}

impl MemoryProvider for AnyMemory {
    fn add(&mut self, item: MemoryItem) -> Result<usize, MemoryError> {
        delegate_memory!(self, |p| p.add(item))
    }

    fn get(&self, index: usize) -> Result<Arc<MemoryItem>, MemoryError> {
        delegate_memory!(self, |p| p.get(index))
    }

    fn get_relevant(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<MemoryItemRelevance>, MemoryError> {
        delegate_memory!(self, |p| p.get_relevant(query, k))
    }

    fn clear(&mut self) -> Result<(), MemoryError> {
        delegate_memory!(self, |p| p.clear())
    }

    fn count(&self) -> usize {
        delegate_memory!(self, |p| p.count())
    }

    fn name(&self) -> &'static str {
        delegate_memory!(self, |p| p.name())
    }

    fn dimension(&self) -> Option<usize> {
        delegate_memory!(self, |p| p.dimension())
    }

    fn items(&self) -> Vec<Arc<MemoryItem>> {
        delegate_memory!(self, |p| p.items())
    }
}
