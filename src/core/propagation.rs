//! Sentiment propagation: threads an effective sentiment down each branch
//!
//! A neutral comment (|raw| < threshold) inherits its parent's effective
//! sentiment; anything else overrides it. The first sign flip on a path is
//! remembered for every descendant on that path.

use tracing::trace;

use crate::core::providers::{checked_sentiment, SentimentScorer};
use crate::types::{CommentTree, NodeSentiment, Result, SentimentTrace, ThreadError};
use crate::NEUTRAL_THRESHOLD;

/// Shared traversal behind defection, resilience and reciprocity
#[derive(Debug, Clone, Copy)]
pub struct SentimentPropagator {
    neutral_threshold: f64,
}

impl Default for SentimentPropagator {
    fn default() -> Self {
        Self::new(NEUTRAL_THRESHOLD)
    }
}

impl SentimentPropagator {
    /// Propagator with a custom neutral threshold
    pub fn new(neutral_threshold: f64) -> Self {
        Self { neutral_threshold }
    }

    pub fn neutral_threshold(&self) -> f64 {
        self.neutral_threshold
    }

    /// Score every node body once, indexed by `NodeId`
    pub fn score_nodes(tree: &CommentTree, scorer: &dyn SentimentScorer) -> Result<Vec<f64>> {
        (0..tree.len())
            .map(|id| match tree.node(id) {
                Some(node) => checked_sentiment(scorer, &node.body),
                None => Ok(0.0),
            })
            .collect()
    }

    /// Score and propagate in one call
    pub fn propagate(&self, tree: &CommentTree, scorer: &dyn SentimentScorer) -> Result<SentimentTrace> {
        let raw = Self::score_nodes(tree, scorer)?;
        self.propagate_scores(tree, &raw)
    }

    /// Propagate precomputed raw scores (one per node, post at index 0)
    pub fn propagate_scores(&self, tree: &CommentTree, raw: &[f64]) -> Result<SentimentTrace> {
        if raw.len() != tree.len() {
            return Err(ThreadError::ScoreCountMismatch {
                nodes: tree.len(),
                scores: raw.len(),
            });
        }

        let order = tree.preorder();
        let mut nodes: Vec<Option<NodeSentiment>> = vec![None; tree.len()];

        for &id in &order {
            let Some(node) = tree.node(id) else { continue };
            let r = raw[id];

            let (inherited, inherited_defection) = match node.parent.and_then(|p| nodes[p]) {
                Some(parent) => (parent.effective, parent.first_defection),
                // the post is measured against itself
                None => (r, None),
            };

            let effective = if r.abs() < self.neutral_threshold { inherited } else { r };
            let first_defection = inherited_defection
                .or_else(|| (effective * inherited < 0.0).then_some(node.depth));

            if first_defection.is_some() && inherited_defection.is_none() {
                trace!(node = id, depth = node.depth, inherited, effective, "sign flip");
            }

            nodes[id] = Some(NodeSentiment {
                node: id,
                parent: node.parent,
                depth: node.depth,
                raw: r,
                inherited,
                effective,
                first_defection,
            });
        }

        Ok(SentimentTrace {
            neutral_threshold: self.neutral_threshold,
            nodes: nodes.into_iter().flatten().collect(),
            order,
            leaves: tree.leaves(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
