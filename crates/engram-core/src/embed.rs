//! Ollama-backed text embedding.

use std::time::Duration;

use engram_memory::{EmbedError, Embedder};
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Calls `POST {base_url}/api/embed` once per text.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl OllamaEmbedder {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(30)))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("engram/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/embed", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            })
            .send()?
            .error_for_status()?;
        let body: EmbedResponse = response.json()?;
        match body.embeddings.into_iter().next() {
            Some(vector) if !vector.is_empty() => Ok(vector),
            _ => Err(format!("model '{}' returned no embedding", self.model).into()),
        }
    }
}
