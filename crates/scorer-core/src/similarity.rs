//! Top-k similarity scoring.
//!
//! A label's score is the mean of the `k` highest cosine similarities between
//! the query and the label's descriptions. With unit vectors the cosine is
//! just the dot product.

use std::cmp::Ordering;

use scorer_embeddings::Embedding;
use serde::{Deserialize, Serialize};

use crate::description::DescriptionSet;
use crate::store::LabelStore;

/// A label and its score against a query, in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Mean of the `k` largest values, with `k` clamped to the number of values.
///
/// Returns `None` for no values or `k == 0`.
pub fn top_k_mean(similarities: &[f32], k: usize) -> Option<f32> {
    let k = k.min(similarities.len());
    if k == 0 {
        return None;
    }

    let mut sorted = similarities.to_vec();
    sorted.sort_unstable_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let sum: f32 = sorted[..k].iter().sum();
    Some(sum / k as f32)
}

/// Score one description set against a query vector.
pub fn score_set(query: &Embedding, set: &DescriptionSet, k: usize) -> Option<f32> {
    let similarities: Vec<f32> = set
        .vectors()
        .iter()
        .map(|v| query.cosine_similarity(v))
        .collect();
    // Rounding can push a unit-vector cosine just past 1
    top_k_mean(&similarities, k).map(|score| score.clamp(-1.0, 1.0))
}

/// Score every label in the store, best first.
///
/// Equal scores are ordered by label name. Labels without vectors are left
/// out.
pub fn rank(query: &Embedding, store: &LabelStore, k: usize) -> Vec<LabelScore> {
    let mut scores: Vec<LabelScore> = store
        .iter()
        .filter_map(|(label, set)| {
            score_set(query, set, k).map(|score| LabelScore {
                label: label.to_string(),
                score,
            })
        })
        .collect();

    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_mean_basic() {
        let sims = [0.1, 0.9, 0.5, 0.7];
        assert!((top_k_mean(&sims, 2).unwrap() - 0.8).abs() < 1e-6);
        assert!((top_k_mean(&sims, 1).unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_mean_clamps_k() {
        let sims = [0.2, 0.4];
        assert!((top_k_mean(&sims, 10).unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_mean_single_value() {
        assert!((top_k_mean(&[0.42], 3).unwrap() - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_mean_empty() {
        assert!(top_k_mean(&[], 3).is_none());
        assert!(top_k_mean(&[0.5], 0).is_none());
    }

    #[test]
    fn test_top_k_mean_with_ties() {
        let sims = [0.5, 0.5, 0.5, -1.0];
        assert!((top_k_mean(&sims, 3).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_score_set() {
        let mut set = DescriptionSet::seeded("Work", Embedding::new(vec![0.0, 1.0]));
        set.push("coding", Embedding::new(vec![1.0, 0.0]), 10);
        let query = Embedding::new(vec![1.0, 0.0]);

        // Similarities are [0.0, 1.0]
        assert!((score_set(&query, &set, 1).unwrap() - 1.0).abs() < 1e-6);
        assert!((score_set(&query, &set, 2).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rank_orders_by_score_then_label() {
        let mut store = LabelStore::new();
        store
            .insert(DescriptionSet::seeded("b", Embedding::new(vec![1.0, 0.0])))
            .unwrap();
        store
            .insert(DescriptionSet::seeded("a", Embedding::new(vec![1.0, 0.0])))
            .unwrap();
        store
            .insert(DescriptionSet::seeded("c", Embedding::new(vec![0.0, 1.0])))
            .unwrap();

        let ranked = rank(&Embedding::new(vec![1.0, 0.0]), &store, 3);
        let labels: Vec<&str> = ranked.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }
}
