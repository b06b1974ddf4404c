//! Seam to the external embedding model.

/// Failure reported by an embedder, propagated to callers unchanged.
pub type EmbedError = Box<dyn std::error::Error + Send + Sync>;

/// Maps text to a fixed-length vector.
///
/// Implementations are synchronous and may block on network I/O. Any closure
/// of the shape `Fn(&str) -> Result<Vec<f32>, EmbedError>` is an embedder.
pub trait Embedder {
    /// # Errors
    ///
    /// Returns an error if the embedding backend is unreachable or replies with
    /// something that is not a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

impl<F> Embedder for F
where
    F: Fn(&str) -> Result<Vec<f32>, EmbedError>,
{
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self(text)
    }
}

/// Deterministic bag-of-words embedder for tests.
///
/// Each lowercase word is hashed into one of `dimension` buckets, then the
/// vector is L2-normalised. Texts sharing words score higher than unrelated
/// ones, which is enough to exercise ranking without a model.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub dimension: usize,
    pub fail: bool,
}

#[cfg(any(test, feature = "mock"))]
impl MockEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            dimension: 0,
            fail: true,
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if self.fail {
            return Err("mock embedder unavailable".into());
        }
        let mut vector = vec![0.0_f32; self.dimension];
        if self.dimension == 0 {
            return Ok(vector);
        }
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
                    (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
                });
            #[expect(clippy::cast_possible_truncation)]
            let bucket = (hash % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }
}
