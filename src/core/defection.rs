//! Defection: how deep into a branch the first sentiment reversal happens
//!
//! Branch score = depth of first flip / nodes on the path (post included),
//! or 1.0 if the branch never flips. The thread score is the mean.

use tracing::debug;

use crate::core::propagation::SentimentPropagator;
use crate::core::providers::SentimentScorer;
use crate::types::{CommentTree, MetricReason, MetricResult, Result, SentimentTrace};

/// Defection scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct DefectionEngine {
    propagator: SentimentPropagator,
}

impl DefectionEngine {
    /// Engine with a custom neutral threshold
    pub fn new(neutral_threshold: f64) -> Self {
        Self {
            propagator: SentimentPropagator::new(neutral_threshold),
        }
    }

    /// Propagate and score; NaN when the thread has no comments
    pub fn score(&self, tree: &CommentTree, scorer: &dyn SentimentScorer) -> Result<MetricResult> {
        let trace = self.propagator.propagate(tree, scorer)?;
        Ok(Self::score_trace(&trace))
    }

    /// Score an existing trace
    pub fn score_trace(trace: &SentimentTrace) -> MetricResult {
        let scores = Self::branch_scores(trace);
        if scores.is_empty() {
            debug!("defection: no branches");
            return MetricResult::sentinel(f64::NAN, MetricReason::D201_DEFECTION_NO_BRANCHES);
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        MetricResult::computed(mean, MetricReason::D200_DEFECTION_COMPUTED, scores.len())
    }

    /// One score per branch, leaves in pre-order
    pub fn branch_scores(trace: &SentimentTrace) -> Vec<f64> {
        trace
            .leaves
            .iter()
            .filter_map(|&leaf| trace.get(leaf))
            .map(|leaf| match leaf.first_defection {
                Some(depth) => depth as f64 / (leaf.depth + 1) as f64,
                None => 1.0,
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
