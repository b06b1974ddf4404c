use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::MemoryError;
use crate::item::MemoryItem;
use crate::provider::{MemoryProvider, MemoryStats};
use crate::relevance::MemoryItemRelevance;

/// Cloneable handle that serialises every call on one provider behind a
/// single lock, for hosts that touch memory from several threads.
#[derive(Debug)]
pub struct SharedMemory<M> {
    inner: Arc<Mutex<M>>,
}

impl<M> Clone for SharedMemory<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: MemoryProvider> SharedMemory<M> {
    #[must_use]
    pub fn new(memory: M) -> Self {
        Self {
            inner: Arc::new(Mutex::new(memory)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, M>, MemoryError> {
        self.inner.lock().map_err(|_| MemoryError::Poisoned)
    }

    /// # Errors
    ///
    /// See [`MemoryProvider::add`]; `Poisoned` if another holder panicked.
    pub fn add(&self, item: MemoryItem) -> Result<usize, MemoryError> {
        self.lock()?.add(item)
    }

    /// # Errors
    ///
    /// See [`MemoryProvider::get`].
    pub fn get(&self, index: usize) -> Result<Arc<MemoryItem>, MemoryError> {
        self.lock()?.get(index)
    }

    /// # Errors
    ///
    /// See [`MemoryProvider::get_relevant`].
    pub fn get_relevant(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<MemoryItemRelevance>, MemoryError> {
        self.lock()?.get_relevant(query, k)
    }

    /// # Errors
    ///
    /// See [`MemoryProvider::clear`].
    pub fn clear(&self) -> Result<(), MemoryError> {
        self.lock()?.clear()
    }

    /// # Errors
    ///
    /// Returns `Poisoned` if another holder panicked.
    pub fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.lock()?.count())
    }

    /// # Errors
    ///
    /// Returns `Poisoned` if another holder panicked.
    pub fn stats(&self) -> Result<MemoryStats, MemoryError> {
        Ok(self.lock()?.stats())
    }

    /// Run `f` with exclusive access to the provider.
    ///
    /// # Errors
    ///
    /// Returns `Poisoned` if another holder panicked.
    pub fn with<R>(&self, f: impl FnOnce(&mut M) -> R) -> Result<R, MemoryError> {
        Ok(f(&mut *self.lock()?))
    }
}
