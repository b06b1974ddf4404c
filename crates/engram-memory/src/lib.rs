//! Semantic memory providers: embedded text items, cosine ranking, and
//! interchangeable backends behind one contract.

pub mod any;
pub mod backend;
pub mod embed;
pub mod error;
pub mod item;
pub mod json_file;
pub mod no_memory;
pub mod provider;
pub mod relevance;
pub mod shared;
pub mod splitter;

pub use any::AnyMemory;
pub use backend::{BackendKind, ProviderConfig, select, supported_backends};
pub use embed::{EmbedError, Embedder};
pub use error::MemoryError;
pub use item::MemoryItem;
pub use provider::{MemoryProvider, MemoryStats};
pub use relevance::MemoryItemRelevance;
