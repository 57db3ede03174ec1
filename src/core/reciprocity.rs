//! Reciprocity: mean depth of the first raw sentiment flip on each path
//!
//! Unlike defection there is no neutral inheritance: every comment is
//! compared against its parent's raw score. A flip ends the walk down
//! that subtree, so each flip point is counted once.

use tracing::debug;

use crate::core::propagation::SentimentPropagator;
use crate::core::providers::SentimentScorer;
use crate::types::{CommentTree, MetricReason, MetricResult, Result, SentimentTrace};

/// Reciprocity scorer
#[derive(Debug, Clone, Copy)]
pub struct ReciprocityEngine {
    propagator: SentimentPropagator,
}

impl Default for ReciprocityEngine {
    fn default() -> Self {
        Self {
            propagator: SentimentPropagator::new(0.0),
        }
    }
}

impl ReciprocityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propagator to build a compatible trace with
    pub fn propagator(&self) -> SentimentPropagator {
        self.propagator
    }

    /// Propagate and score
    pub fn score(&self, tree: &CommentTree, scorer: &dyn SentimentScorer) -> Result<MetricResult> {
        let trace = self.propagator.propagate(tree, scorer)?;
        Ok(Self::score_trace(&trace))
    }

    /// Score a trace built with a zero neutral threshold
    pub fn score_trace(trace: &SentimentTrace) -> MetricResult {
        let depths = Self::flip_depths(trace);
        if depths.is_empty() {
            debug!("reciprocity: no raw sign flip");
            return MetricResult::sentinel(f64::NAN, MetricReason::P501_RECIPROCITY_NO_DEFECTION);
        }

        let mean = depths.iter().sum::<usize>() as f64 / depths.len() as f64;
        MetricResult::computed(mean, MetricReason::P500_RECIPROCITY_COMPUTED, depths.len())
    }

    /// Depth of every node where a path first flips, in pre-order
    pub fn flip_depths(trace: &SentimentTrace) -> Vec<usize> {
        trace
            .order
            .iter()
            .filter_map(|&id| trace.get(id))
            .filter(|n| n.first_defection == Some(n.depth))
            .map(|n| n.depth)
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ROOT;

    fn trace(tree: &CommentTree, raw: &[f64]) -> SentimentTrace {
        ReciprocityEngine::new().propagator().propagate_scores(tree, raw).unwrap()
    }

    #[test]
    fn test_no_flip_is_nan() {
        let mut tree = CommentTree::with_root(None, "post".into(), 0);
        tree.attach(ROOT, "u".into(), "a".into(), 0);
        let result = ReciprocityEngine::score_trace(&trace(&tree, &[0.5, 0.4]));
        assert!(result.value.is_nan());
        assert_eq!(result.reason, MetricReason::P501_RECIPROCITY_NO_DEFECTION);
    }

    #[test]
    fn test_weak_scores_still_flip() {
        // 0.1 -> -0.1 would be neutral for defection but flips here
        let mut tree = CommentTree::with_root(None, "post".into(), 0);
        tree.attach(ROOT, "u".into(), "a".into(), 0);
        let result = ReciprocityEngine::score_trace(&trace(&tree, &[0.1, -0.1]));
        assert_eq!(result.value, 1.0);
        assert_eq!(result.samples, 1);
    }

    #[test]
    fn test_subtree_pruned_after_flip() {
        // post(+) -> a(-) -> b(+): only a counts
        let mut tree = CommentTree::with_root(None, "post".into(), 0);
        let a = tree.attach(ROOT, "u".into(), "a".into(), 0);
        tree.attach(a, "u".into(), "b".into(), 0);
        let result = ReciprocityEngine::score_trace(&trace(&tree, &[0.5, -0.5, 0.5]));
        assert_eq!(result.value, 1.0);
        assert_eq!(result.samples, 1);
    }

    #[test]
    fn test_mean_over_flip_points() {
        // branch one flips at depth 1, branch two at depth 3
        let mut tree = CommentTree::with_root(None, "post".into(), 0);
        tree.attach(ROOT, "u".into(), "a".into(), 0);
        let b = tree.attach(ROOT, "u".into(), "b".into(), 0);
        let c = tree.attach(b, "u".into(), "c".into(), 0);
        tree.attach(c, "u".into(), "d".into(), 0);
        let result = ReciprocityEngine::score_trace(&trace(&tree, &[0.5, -0.5, 0.5, 0.6, -0.2]));
        assert_eq!(result.value, 2.0);
        assert_eq!(result.samples, 2);
    }

    #[test]
    fn test_zero_score_never_flips() {
        let mut tree = CommentTree::with_root(None, "post".into(), 0);
        let a = tree.attach(ROOT, "u".into(), "a".into(), 0);
        tree.attach(a, "u".into(), "b".into(), 0);
        let result = ReciprocityEngine::score_trace(&trace(&tree, &[0.5, 0.0, -0.5]));
        assert!(result.value.is_nan());
    }
}
