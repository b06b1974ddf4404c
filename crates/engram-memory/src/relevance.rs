use std::sync::Arc;

use crate::item::MemoryItem;

/// Cosine similarity of two equal-length vectors, clamped to `[-1, 1]`.
///
/// Accumulates in `f64` and divides by `sqrt(|a|² · |b|²)` so that a vector
/// scored against itself yields exactly `1.0`. A zero-norm input scores `0.0`.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    #[expect(clippy::cast_possible_truncation)]
    let score = (dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0) as f32;
    score
}

/// Scores of one item against one query. Computed per query, never stored.
#[derive(Debug, Clone)]
pub struct MemoryItemRelevance {
    memory_item: Arc<MemoryItem>,
    chunk_scores: Vec<f32>,
    summary_score: Option<f32>,
    best_score: f32,
}

impl MemoryItemRelevance {
    /// Score every chunk embedding and the summary embedding of `item`.
    ///
    /// The caller guarantees `query` has the item's dimensionality.
    #[must_use]
    pub fn score(memory_item: Arc<MemoryItem>, query: &[f32]) -> Self {
        let chunk_scores: Vec<f32> = memory_item
            .chunk_embeddings()
            .iter()
            .map(|e| cosine_similarity(query, e))
            .collect();
        let summary_score = memory_item
            .summary_embedding()
            .map(|e| cosine_similarity(query, e));
        let best_score = chunk_scores
            .iter()
            .copied()
            .chain(summary_score)
            .fold(f32::NEG_INFINITY, f32::max);

        Self {
            memory_item,
            chunk_scores,
            summary_score,
            best_score,
        }
    }

    #[must_use]
    pub fn memory_item(&self) -> &MemoryItem {
        &self.memory_item
    }

    #[must_use]
    pub fn chunk_scores(&self) -> &[f32] {
        &self.chunk_scores
    }

    #[must_use]
    pub fn summary_score(&self) -> Option<f32> {
        self.summary_score
    }

    /// Maximum over the chunk scores and the summary score.
    #[must_use]
    pub fn best_score(&self) -> f32 {
        self.best_score
    }

    /// Index of the highest-scoring chunk; the first one on ties.
    #[must_use]
    pub fn most_relevant_chunk_index(&self) -> usize {
        self.chunk_scores
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, &s)| {
                if s > best { (i, s) } else { (best_i, best) }
            })
            .0
    }

    #[must_use]
    pub fn most_relevant_chunk(&self) -> &str {
        &self.memory_item.chunks()[self.most_relevant_chunk_index()]
    }
}

/// Score `items` against `query` and keep the best `k`.
///
/// Sorting is stable, so equal scores keep insertion order. This exhaustive
/// scan is the only place ranking happens; an approximate index would
/// replace it without changing what providers return.
#[must_use]
pub fn rank(items: &[Arc<MemoryItem>], query: &[f32], k: usize) -> Vec<MemoryItemRelevance> {
    if k == 0 {
        return Vec::new();
    }
    let mut scored: Vec<MemoryItemRelevance> = items
        .iter()
        .map(|item| MemoryItemRelevance::score(Arc::clone(item), query))
        .collect();
    scored.sort_by(|a, b| b.best_score.total_cmp(&a.best_score));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    fn item(text: &str, embeddings: Vec<Vec<f32>>) -> Arc<MemoryItem> {
        let chunks = (0..embeddings.len()).map(|i| format!("{text} {i}")).collect();
        Arc::new(MemoryItem::new(text, chunks, embeddings, BTreeMap::new()).unwrap())
    }

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.3, -1.7, 2.9, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < f32::EPSILON);
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), 0.0);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]), -1.0);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn best_score_includes_summary() {
        let base = item("a", vec![vec![1.0, 0.0]]);
        let with_summary = Arc::new(
            MemoryItem::clone(&base)
                .with_summary_embedding("sum", vec![0.0, 1.0])
                .unwrap(),
        );
        let rel = MemoryItemRelevance::score(with_summary, &[0.0, 1.0]);
        assert_eq!(rel.chunk_scores(), &[0.0]);
        assert_eq!(rel.summary_score(), Some(1.0));
        assert_eq!(rel.best_score(), 1.0);
    }

    #[test]
    fn most_relevant_chunk_is_argmax() {
        let it = item("doc", vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]]);
        let rel = MemoryItemRelevance::score(it, &[1.0, 0.0]);
        assert_eq!(rel.most_relevant_chunk_index(), 1);
        assert_eq!(rel.most_relevant_chunk(), "doc 1");
    }

    #[test]
    fn rank_orders_descending_and_truncates() {
        let items = vec![
            item("far", vec![vec![0.0, 1.0]]),
            item("near", vec![vec![1.0, 0.1]]),
            item("exact", vec![vec![1.0, 0.0]]),
        ];
        let ranked = rank(&items, &[1.0, 0.0], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].memory_item().raw_content(), "exact");
        assert_eq!(ranked[1].memory_item().raw_content(), "near");
    }

    #[test]
    fn rank_breaks_ties_by_insertion_order() {
        let items = vec![
            item("first", vec![vec![1.0, 0.0]]),
            item("second", vec![vec![2.0, 0.0]]),
            item("third", vec![vec![3.0, 0.0]]),
        ];
        let ranked = rank(&items, &[1.0, 0.0], 3);
        let order: Vec<&str> = ranked
            .iter()
            .map(|r| r.memory_item().raw_content())
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn rank_with_nan_query_keeps_insertion_order() {
        let items = vec![
            item("first", vec![vec![1.0, 0.0]]),
            item("second", vec![vec![0.0, 1.0]]),
        ];
        let ranked = rank(&items, &[f32::NAN, 0.0], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].memory_item().raw_content(), "first");
        assert_eq!(ranked[1].memory_item().raw_content(), "second");
    }

    #[test]
    fn rank_with_zero_k_is_empty() {
        let items = vec![item("a", vec![vec![1.0]])];
        assert!(rank(&items, &[1.0], 0).is_empty());
    }

    fn vector(len: usize) -> impl Strategy<Value = Vec<f32>> {
        proptest::collection::vec(-100.0_f32..100.0, len)
    }

    proptest! {
        #[test]
        fn cosine_is_symmetric((a, b) in (1usize..32).prop_flat_map(|n| (vector(n), vector(n)))) {
            prop_assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        }

        #[test]
        fn cosine_is_bounded((a, b) in (1usize..32).prop_flat_map(|n| (vector(n), vector(n)))) {
            let s = cosine_similarity(&a, &b);
            prop_assert!((-1.0..=1.0).contains(&s));
        }

        #[test]
        fn rank_is_non_increasing(
            embeddings in proptest::collection::vec(vector(4), 1..20),
            query in vector(4),
            k in 0usize..25,
        ) {
            let items: Vec<_> = embeddings.into_iter().map(|e| item("x", vec![e])).collect();
            let ranked = rank(&items, &query, k);
            prop_assert!(ranked.len() <= k);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].best_score() >= pair[1].best_score());
            }
        }
    }
}
