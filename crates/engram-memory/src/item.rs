use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::embed::Embedder;
use crate::error::MemoryError;
use crate::splitter::TextSplitter;

/// Metadata key recording where an item's text came from.
pub const SOURCE_TYPE_KEY: &str = "source_type";

/// One stored memory: raw text, its chunks, one embedding per chunk, and an
/// optional embedded summary.
///
/// Items are immutable once built. Every constructor validates that there is
/// at least one chunk, that each chunk has an embedding, and that all vectors
/// share one dimensionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    raw_content: String,
    chunks: Vec<String>,
    chunk_embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    summary_embedding: Option<Vec<f32>>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl MemoryItem {
    /// Build an item from pre-chunked, pre-embedded content.
    ///
    /// # Errors
    ///
    /// Returns `InvalidItem` if there are no chunks or the embedding count
    /// differs from the chunk count, and `DimensionMismatch` if the
    /// embeddings disagree on length.
    pub fn new(
        raw_content: impl Into<String>,
        chunks: Vec<String>,
        chunk_embeddings: Vec<Vec<f32>>,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self, MemoryError> {
        let item = Self {
            raw_content: raw_content.into(),
            chunks,
            chunk_embeddings,
            summary: None,
            summary_embedding: None,
            metadata,
        };
        item.validate()?;
        Ok(item)
    }

    /// Chunk `text` with `splitter` and embed every chunk.
    ///
    /// `source_type` is stored under [`SOURCE_TYPE_KEY`] in the metadata.
    ///
    /// # Errors
    ///
    /// Returns `InvalidItem` for blank text, `EmbeddingUnavailable` if the
    /// embedder fails, and `DimensionMismatch` if it returns vectors of
    /// varying length.
    pub fn from_text(
        text: &str,
        source_type: &str,
        mut metadata: BTreeMap<String, String>,
        splitter: &TextSplitter,
        embedder: &(impl Embedder + ?Sized),
    ) -> Result<Self, MemoryError> {
        let chunks = splitter.split(text);
        if chunks.is_empty() {
            return Err(MemoryError::InvalidItem("text is blank".into()));
        }

        let chunk_embeddings = chunks
            .iter()
            .map(|chunk| embedder.embed(chunk))
            .collect::<Result<Vec<_>, _>>()
            .map_err(MemoryError::EmbeddingUnavailable)?;

        metadata.insert(SOURCE_TYPE_KEY.into(), source_type.into());
        tracing::debug!(
            chunks = chunks.len(),
            source_type,
            "built memory item from text"
        );
        Self::new(text, chunks, chunk_embeddings, metadata)
    }

    /// Attach a summary, embedding it with `embedder`.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingUnavailable` if the embedder fails and
    /// `DimensionMismatch` if the summary vector length differs from the
    /// chunk vectors.
    pub fn with_summary(
        self,
        summary: impl Into<String>,
        embedder: &(impl Embedder + ?Sized),
    ) -> Result<Self, MemoryError> {
        let summary = summary.into();
        let embedding = embedder
            .embed(&summary)
            .map_err(MemoryError::EmbeddingUnavailable)?;
        self.with_summary_embedding(summary, embedding)
    }

    /// Attach a summary with a precomputed embedding.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `embedding` length differs from the
    /// chunk vectors.
    pub fn with_summary_embedding(
        mut self,
        summary: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Result<Self, MemoryError> {
        self.summary = Some(summary.into());
        self.summary_embedding = Some(embedding);
        self.validate()?;
        Ok(self)
    }

    /// Check the structural invariants. Run on construction and on every item
    /// read back from disk.
    ///
    /// # Errors
    ///
    /// See [`MemoryItem::new`]. Also rejects a summary without an embedding
    /// and vice versa, and any NaN or infinite embedding component.
    pub fn validate(&self) -> Result<(), MemoryError> {
        let Some(first) = self.chunk_embeddings.first() else {
            return Err(MemoryError::InvalidItem("item has no chunks".into()));
        };
        if self.chunks.len() != self.chunk_embeddings.len() {
            return Err(MemoryError::InvalidItem(format!(
                "{} chunks but {} chunk embeddings",
                self.chunks.len(),
                self.chunk_embeddings.len()
            )));
        }
        if first.is_empty() {
            return Err(MemoryError::InvalidItem("embedding is empty".into()));
        }
        if self.summary.is_some() != self.summary_embedding.is_some() {
            return Err(MemoryError::InvalidItem(
                "summary and summary embedding must be set together".into(),
            ));
        }

        let expected = first.len();
        if let Some(bad) = self.embeddings().find(|e| e.len() != expected) {
            return Err(MemoryError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }
        // JSON has no encoding for NaN or infinity.
        if self.embeddings().flatten().any(|x| !x.is_finite()) {
            return Err(MemoryError::InvalidItem(
                "embedding contains a non-finite value".into(),
            ));
        }
        Ok(())
    }

    /// Length shared by every embedding of this item.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.chunk_embeddings.first().map_or(0, Vec::len)
    }

    /// All vectors of the item: chunk embeddings first, then the summary one.
    pub fn embeddings(&self) -> impl Iterator<Item = &[f32]> {
        self.chunk_embeddings
            .iter()
            .chain(self.summary_embedding.iter())
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    #[must_use]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[must_use]
    pub fn chunk_embeddings(&self) -> &[Vec<f32>] {
        &self.chunk_embeddings
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    #[must_use]
    pub fn summary_embedding(&self) -> Option<&[f32]> {
        self.summary_embedding.as_deref()
    }

    #[must_use]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    #[must_use]
    pub fn source_type(&self) -> Option<&str> {
        self.metadata.get(SOURCE_TYPE_KEY).map(String::as_str)
    }

    /// Human-readable rendering for logs and the CLI.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = format!(
            "=============== MemoryItem ===============\n\
             Size: {} chunks, dimension {}\n",
            self.chunks.len(),
            self.dimension()
        );
        if !self.metadata.is_empty() {
            out.push_str("Metadata:\n");
            for (key, value) in &self.metadata {
                let _ = writeln!(out, "  {key}: {value}");
            }
        }
        if let Some(summary) = &self.summary {
            let _ = writeln!(out, "Summary:\n  {summary}");
        }
        let _ = write!(
            out,
            "--------------- Raw content ---------------\n{}\n\
             ==========================================",
            self.raw_content
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::{EmbedError, MockEmbedder};
    use crate::splitter::SplitterConfig;

    fn item(embeddings: Vec<Vec<f32>>) -> Result<MemoryItem, MemoryError> {
        let chunks = (0..embeddings.len()).map(|i| format!("chunk {i}")).collect();
        MemoryItem::new("raw", chunks, embeddings, BTreeMap::new())
    }

    #[test]
    fn new_accepts_consistent_item() {
        let item = item(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(item.dimension(), 2);
        assert_eq!(item.chunks().len(), 2);
        assert!(item.summary().is_none());
    }

    #[test]
    fn new_rejects_no_chunks() {
        let err = item(vec![]).unwrap_err();
        assert!(matches!(err, MemoryError::InvalidItem(_)));
    }

    #[test]
    fn new_rejects_count_mismatch() {
        let err = MemoryItem::new(
            "raw",
            vec!["a".into(), "b".into()],
            vec![vec![1.0]],
            BTreeMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidItem(_)));
    }

    #[test]
    fn new_rejects_mixed_dimensions() {
        let err = item(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn new_rejects_empty_vector() {
        let err = item(vec![vec![]]).unwrap_err();
        assert!(matches!(err, MemoryError::InvalidItem(_)));
    }

    #[test]
    fn new_rejects_non_finite_components() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let err = item(vec![vec![bad, 0.0]]).unwrap_err();
            assert!(matches!(err, MemoryError::InvalidItem(_)), "{bad}");
        }
    }

    #[test]
    fn summary_embedding_must_be_finite() {
        let err = item(vec![vec![1.0, 0.0]])
            .unwrap()
            .with_summary_embedding("sum", vec![0.0, f32::NAN])
            .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidItem(_)));
    }

    #[test]
    fn summary_must_match_dimension() {
        let err = item(vec![vec![1.0, 0.0]])
            .unwrap()
            .with_summary_embedding("short", vec![1.0])
            .unwrap_err();
        assert!(matches!(err, MemoryError::DimensionMismatch { .. }));
    }

    #[test]
    fn summary_is_included_in_embeddings() {
        let item = item(vec![vec![1.0, 0.0]])
            .unwrap()
            .with_summary_embedding("short", vec![0.0, 1.0])
            .unwrap();
        assert_eq!(item.summary(), Some("short"));
        assert_eq!(item.embeddings().count(), 2);
    }

    #[test]
    fn summary_without_embedding_fails_validation() {
        let json = r#"{"raw_content":"r","chunks":["r"],"chunk_embeddings":[[1.0]],"summary":"s"}"#;
        let item: MemoryItem = serde_json::from_str(json).unwrap();
        assert!(matches!(
            item.validate(),
            Err(MemoryError::InvalidItem(_))
        ));
    }

    #[test]
    fn from_text_embeds_every_chunk() {
        let splitter = TextSplitter::new(SplitterConfig {
            chunk_size: 12,
            chunk_overlap: 0,
            sentence_aware: true,
        });
        let item = MemoryItem::from_text(
            "Cats purr. Dogs bark. Birds sing.",
            "text_file",
            BTreeMap::from([("path".to_owned(), "notes.txt".to_owned())]),
            &splitter,
            &MockEmbedder::new(8),
        )
        .unwrap();

        assert_eq!(item.chunks().len(), 3);
        assert_eq!(item.chunk_embeddings().len(), 3);
        assert_eq!(item.dimension(), 8);
        assert_eq!(item.source_type(), Some("text_file"));
        assert_eq!(item.metadata()["path"], "notes.txt");
        assert_eq!(item.raw_content(), "Cats purr. Dogs bark. Birds sing.");
    }

    #[test]
    fn from_text_rejects_blank_text() {
        let err = MemoryItem::from_text(
            "   ",
            "text",
            BTreeMap::new(),
            &TextSplitter::default(),
            &MockEmbedder::new(4),
        )
        .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidItem(_)));
    }

    #[test]
    fn from_text_propagates_embedder_failure() {
        let err = MemoryItem::from_text(
            "hello",
            "text",
            BTreeMap::new(),
            &TextSplitter::default(),
            &MockEmbedder::failing(),
        )
        .unwrap_err();
        let MemoryError::EmbeddingUnavailable(source) = err else {
            panic!("expected EmbeddingUnavailable, got {err:?}");
        };
        assert_eq!(source.to_string(), "mock embedder unavailable");
    }

    #[test]
    fn with_summary_uses_embedder() {
        let embedder = MockEmbedder::new(4);
        let item = MemoryItem::from_text(
            "alpha beta",
            "text",
            BTreeMap::new(),
            &TextSplitter::default(),
            &embedder,
        )
        .unwrap()
        .with_summary("alpha", &embedder)
        .unwrap();
        assert_eq!(
            item.summary_embedding().unwrap(),
            embedder.embed("alpha").unwrap().as_slice()
        );
    }

    #[test]
    fn with_summary_propagates_failure() {
        let base = item(vec![vec![1.0]]).unwrap();
        let failing = |_: &str| -> Result<Vec<f32>, EmbedError> { Err("offline".into()) };
        let err = base.with_summary("s", &failing).unwrap_err();
        assert!(matches!(err, MemoryError::EmbeddingUnavailable(_)));
    }

    #[test]
    fn dump_shows_content_and_metadata() {
        let item = MemoryItem::new(
            "remember the milk",
            vec!["remember the milk".into()],
            vec![vec![0.5, 0.5]],
            BTreeMap::from([("source".to_owned(), "chat".to_owned())]),
        )
        .unwrap();
        let dump = item.dump();
        assert!(dump.contains("Size: 1 chunks, dimension 2"));
        assert!(dump.contains("source: chat"));
        assert!(dump.contains("remember the milk"));
    }
}
