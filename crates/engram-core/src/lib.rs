//! Configuration loading, memory bootstrap, and the Ollama embedding client.

pub mod bootstrap;
pub mod config;
pub mod embed;

pub use config::Config;
pub use embed::OllamaEmbedder;
