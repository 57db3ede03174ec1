//! One-sidedness: Gini coefficient of comment counts per author

use std::collections::HashMap;

use tracing::debug;

use crate::types::{CommentNode, MetricReason, MetricResult};
use crate::GINI_EPSILON;

/// One-sidedness scorer
#[derive(Debug, Default, Clone, Copy)]
pub struct OneSidednessEngine;

impl OneSidednessEngine {
    /// Create new engine
    pub fn new() -> Self {
        Self
    }

    /// Gini over the authors of a flattened comment list
    ///
    /// 0.0 means every author wrote equally much; a single author is
    /// reported as 0.0 with a sentinel reason.
    pub fn score(&self, comments: &[&CommentNode]) -> MetricResult {
        let counts = Self::author_counts(comments);
        let frequencies: Vec<usize> = counts.iter().map(|(_, c)| *c).collect();

        if frequencies.len() <= 1 {
            debug!(authors = frequencies.len(), "one-sidedness: single author");
            return MetricResult::sentinel(0.0, MetricReason::G401_ONESIDEDNESS_SINGLE_AUTHOR);
        }
        MetricResult::computed(
            gini(&frequencies),
            MetricReason::G400_ONESIDEDNESS_COMPUTED,
            frequencies.len(),
        )
    }

    /// Comment count per author in first-seen order
    pub fn author_counts(comments: &[&CommentNode]) -> Vec<(String, usize)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for author in comments.iter().filter_map(|c| c.author.as_deref()) {
            match index.get(author) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(author, counts.len());
                    counts.push((author.to_string(), 1));
                }
            }
        }
        counts
    }
}

/// Gini coefficient of non-negative counts, 0.0 for fewer than two
pub fn gini(counts: &[usize]) -> f64 {
    let n = counts.len();
    if n <= 1 {
        return 0.0;
    }

    let mut sorted: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n_f = n as f64;
    let numerator: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, f)| (2.0 * (i + 1) as f64 - n_f - 1.0) * f)
        .sum();
    let denominator = n_f * sorted.iter().sum::<f64>() + GINI_EPSILON;

    numerator / denominator
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn node(author: &str) -> CommentNode {
        CommentNode {
            author: Some(author.into()),
            body: "x".into(),
            score: 0,
            parent: Some(0),
            children: Vec::new(),
            depth: 1,
        }
    }

    #[test]
    fn test_equal_counts_is_zero() {
        assert!(gini(&[3, 3, 3, 3]).abs() < 1e-9);
    }

    #[test]
    fn test_known_value() {
        // sorted [1, 3]: (−1·1 + 1·3) / (2·4) = 0.25
        assert!((gini(&[3, 1]) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_order_independent() {
        assert_eq!(gini(&[5, 1, 2, 9]), gini(&[9, 2, 5, 1]));
    }

    #[test]
    fn test_all_zero_counts_stay_finite() {
        assert_eq!(gini(&[0, 0, 0]), 0.0);
    }

    #[test]
    fn test_single_author_is_exactly_zero() {
        let nodes = vec![node("solo"), node("solo"), node("solo")];
        let refs: Vec<&CommentNode> = nodes.iter().collect();
        let result = OneSidednessEngine::new().score(&refs);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.reason, MetricReason::G401_ONESIDEDNESS_SINGLE_AUTHOR);
    }

    #[test]
    fn test_author_counts_insertion_order() {
        let nodes = vec![node("b"), node("a"), node("b")];
        let refs: Vec<&CommentNode> = nodes.iter().collect();
        assert_eq!(
            OneSidednessEngine::author_counts(&refs),
            vec![("b".to_string(), 2), ("a".to_string(), 1)]
        );
    }
}
