//! Resilience: average sentiment after the first negative turn
//!
//! A negative defection is a move from an effective sentiment >= 0 to one
//! below -neutral_threshold. From that node on (inclusive) every node's
//! effective sentiment is pooled; the score is the pool mean.

use tracing::debug;

use crate::core::propagation::SentimentPropagator;
use crate::core::providers::SentimentScorer;
use crate::types::{CommentTree, MetricReason, MetricResult, Result, SentimentTrace};
use crate::RESILIENCE_DEAD_ZONE;

/// Resilience scorer
#[derive(Debug, Clone, Copy)]
pub struct ResilienceEngine {
    propagator: SentimentPropagator,
    dead_zone: f64,
}

impl Default for ResilienceEngine {
    fn default() -> Self {
        Self {
            propagator: SentimentPropagator::default(),
            dead_zone: RESILIENCE_DEAD_ZONE,
        }
    }
}

impl ResilienceEngine {
    /// Engine with a custom neutral threshold
    pub fn new(neutral_threshold: f64) -> Self {
        Self {
            propagator: SentimentPropagator::new(neutral_threshold),
            ..Self::default()
        }
    }

    /// Override the dead zone half-width
    pub fn with_dead_zone(mut self, dead_zone: f64) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Propagate and score
    pub fn score(&self, tree: &CommentTree, scorer: &dyn SentimentScorer) -> Result<MetricResult> {
        let trace = self.propagator.propagate(tree, scorer)?;
        Ok(self.score_trace(&trace))
    }

    /// Score an existing trace (its own neutral threshold applies)
    pub fn score_trace(&self, trace: &SentimentTrace) -> MetricResult {
        let pool = Self::post_defection_pool(trace);
        if pool.is_empty() {
            debug!("resilience: no negative defection");
            return MetricResult::sentinel(f64::NAN, MetricReason::S301_RESILIENCE_NO_DEFECTION);
        }

        let mean = pool.iter().sum::<f64>() / pool.len() as f64;
        if mean.abs() <= self.dead_zone {
            debug!(mean, dead_zone = self.dead_zone, "resilience: inside dead zone");
            return MetricResult::sentinel(f64::NAN, MetricReason::S302_RESILIENCE_DEAD_ZONE);
        }
        MetricResult::computed(mean, MetricReason::S300_RESILIENCE_COMPUTED, pool.len())
    }

    /// Effective sentiments at and after each path's first negative turn
    pub fn post_defection_pool(trace: &SentimentTrace) -> Vec<f64> {
        let threshold = trace.neutral_threshold;
        let mut defected = vec![false; trace.nodes.len()];
        let mut pool = Vec::new();

        for &id in &trace.order {
            let Some(node) = trace.get(id) else { continue };
            let Some(parent) = node.parent else { continue };

            let turned = node.inherited >= 0.0 && node.effective < -threshold;
            defected[id] = defected[parent] || turned;
            if defected[id] {
                pool.push(node.effective);
            }
        }
        pool
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ROOT;

    fn chain(scores: &[f64]) -> SentimentTrace {
        let mut tree = CommentTree::with_root(None, "post".into(), 0);
        let mut parent = ROOT;
        for i in 1..scores.len() {
            parent = tree.attach(parent, "u".into(), format!("c{}", i), 0);
        }
        SentimentPropagator::default().propagate_scores(&tree, scores).unwrap()
    }

    #[test]
    fn test_all_positive_is_nan() {
        let result = ResilienceEngine::default().score_trace(&chain(&[0.5, 0.6, 0.1, 0.9]));
        assert!(result.value.is_nan());
        assert_eq!(result.reason, MetricReason::S301_RESILIENCE_NO_DEFECTION);
    }

    #[test]
    fn test_recovery_after_defection() {
        // post 0.5 -> 0.6 -> -0.8 (turn) -> 0.9 -> 0.8
        let trace = chain(&[0.5, 0.6, -0.8, 0.9, 0.8]);
        assert_eq!(ResilienceEngine::post_defection_pool(&trace), vec![-0.8, 0.9, 0.8]);

        let result = ResilienceEngine::default().score_trace(&trace);
        assert!((result.value - 0.3).abs() < 1e-12);
        assert_eq!(result.samples, 3);
    }

    #[test]
    fn test_negative_from_negative_is_not_a_turn() {
        // post already negative: nothing ever moves from >= 0 to negative
        let result = ResilienceEngine::default().score_trace(&chain(&[-0.5, -0.6, -0.9]));
        assert!(result.value.is_nan());
    }

    #[test]
    fn test_exact_threshold_is_not_a_turn() {
        let result = ResilienceEngine::default().score_trace(&chain(&[0.5, -0.3]));
        assert_eq!(result.reason, MetricReason::S301_RESILIENCE_NO_DEFECTION);
    }

    #[test]
    fn test_dead_zone_collapses_to_nan() {
        // pool = [-0.5, 0.55] -> mean 0.025
        let result = ResilienceEngine::default().score_trace(&chain(&[0.5, -0.5, 0.55]));
        assert!(result.value.is_nan());
        assert_eq!(result.reason, MetricReason::S302_RESILIENCE_DEAD_ZONE);

        let result = ResilienceEngine::default()
            .with_dead_zone(0.0)
            .score_trace(&chain(&[0.5, -0.5, 0.55]));
        assert!((result.value - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_after_turn_inherits_negative() {
        // -0.8 turn, then a neutral reply inherits -0.8
        let trace = chain(&[0.4, -0.8, 0.05]);
        assert_eq!(ResilienceEngine::post_defection_pool(&trace), vec![-0.8, -0.8]);
    }

    #[test]
    fn test_pool_after_turn() {
        // turn at -0.9, then -0.5 inherits nothing (already non-neutral)
        let result = ResilienceEngine::default().score_trace(&chain(&[0.8, -0.9, -0.5]));
        assert!((result.value + 0.7).abs() < 1e-12);
        assert_eq!(result.samples, 2);
        assert_eq!(result.reason, MetricReason::S300_RESILIENCE_COMPUTED);
    }

    #[test]
    fn test_recovery_inside_dead_zone() {
        // pool [-0.4, 0.35] -> mean -0.025
        let result = ResilienceEngine::default().score_trace(&chain(&[0.8, -0.4, 0.35]));
        assert!(result.value.is_nan());
        assert_eq!(result.reason, MetricReason::S302_RESILIENCE_DEAD_ZONE);
    }

    #[test]
    fn test_mild_negative_is_not_a_turn() {
        // -0.2 is neutral and inherits 0.8
        let result = ResilienceEngine::default().score_trace(&chain(&[0.8, -0.2, 0.5]));
        assert!(result.value.is_nan());
    }

    #[test]
    fn test_negative_parent_does_not_turn() {
        // post is negative: the child never moves from >= 0
        let result = ResilienceEngine::default().score_trace(&chain(&[-0.8, -0.9]));
        assert!(result.value.is_nan());
    }

    #[test]
    fn test_branching_turn_pools_each_node_once() {
        let mut tree = CommentTree::with_root(None, "post".into(), 0);
        let a = tree.attach(ROOT, "u".into(), "a".into(), 0);
        tree.attach(a, "u".into(), "b".into(), 0);
        tree.attach(a, "u".into(), "c".into(), 0);
        let trace = SentimentPropagator::default()
            .propagate_scores(&tree, &[0.5, -0.6, -0.6, -0.9])
            .unwrap();
        assert_eq!(ResilienceEngine::post_defection_pool(&trace), vec![-0.6, -0.6, -0.9]);
    }
}
