//! Thread analyzer: runs every engine over one normalized tree

use chrono::Utc;

use crate::core::coalition::CoalitionEngine;
use crate::core::defection::DefectionEngine;
use crate::core::onesidedness::OneSidednessEngine;
use crate::core::propagation::SentimentPropagator;
use crate::core::providers::{Embedder, SentimentScorer};
use crate::core::reciprocity::ReciprocityEngine;
use crate::core::resilience::ResilienceEngine;
use crate::core::tree_builder::TreeBuilder;
use crate::types::{
    AnalysisConfig, CommentTree, NormalizationSession, PreparedReport, RawThread, Result, ThreadReport,
};

/// Wires providers, engines and the normalization session together
#[derive(Debug, Clone, Default)]
pub struct ThreadAnalyzer {
    config: AnalysisConfig,
}

impl ThreadAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Builder honouring the configured placeholder bodies
    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::with_placeholders(self.config.placeholder_bodies.clone())
    }

    /// Normalize a raw thread, then analyze it
    pub fn analyze_raw(
        &self,
        raw: &RawThread,
        embedder: &dyn Embedder,
        scorer: &dyn SentimentScorer,
        session: &mut NormalizationSession,
    ) -> Result<ThreadReport> {
        Ok(self.prepare_raw(raw, embedder, scorer)?.finish(session))
    }

    /// Compute every metric for `tree`
    pub fn analyze(
        &self,
        tree: &CommentTree,
        embedder: &dyn Embedder,
        scorer: &dyn SentimentScorer,
        session: &mut NormalizationSession,
    ) -> Result<ThreadReport> {
        Ok(self.prepare(tree, embedder, scorer)?.finish(session))
    }

    /// Normalize a raw thread, then prepare its report
    pub fn prepare_raw(
        &self,
        raw: &RawThread,
        embedder: &dyn Embedder,
        scorer: &dyn SentimentScorer,
    ) -> Result<PreparedReport> {
        let tree = self.tree_builder().build(raw)?;
        self.prepare(&tree, embedder, scorer)
    }

    /// Every metric, with coalition diversity left for the session
    ///
    /// Sentiment is scored once per node and shared by the defection,
    /// resilience and reciprocity traces. Comments are embedded only when
    /// there are enough of them to cluster.
    pub fn prepare(
        &self,
        tree: &CommentTree,
        embedder: &dyn Embedder,
        scorer: &dyn SentimentScorer,
    ) -> Result<PreparedReport> {
        let comments = tree.flatten();
        let texts = tree.comment_texts();

        let raw = SentimentPropagator::score_nodes(tree, scorer)?;
        let trace = SentimentPropagator::new(self.config.neutral_threshold).propagate_scores(tree, &raw)?;
        let raw_trace = ReciprocityEngine::new().propagator().propagate_scores(tree, &raw)?;

        let coalition =
            CoalitionEngine::from_config(&self.config).score_with(&texts, embedder, self.config.clusters)?;

        Ok(PreparedReport {
            generated_at: Utc::now(),
            comment_count: comments.len(),
            author_count: tree.authors().len(),
            branch_count: trace.branch_count(),
            max_depth: tree.max_depth(),
            coalition,
            one_sidedness: OneSidednessEngine::new().score(&comments),
            defection: DefectionEngine::score_trace(&trace),
            resilience: ResilienceEngine::new(self.config.neutral_threshold)
                .with_dead_zone(self.config.resilience_dead_zone)
                .score_trace(&trace),
            reciprocity: ReciprocityEngine::score_trace(&raw_trace),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::{HashingEmbedder, PrecomputedSignals};
    use crate::types::{MetricReason, RawComment};

    fn small_thread() -> RawThread {
        RawThread {
            title: Some("Title".into()),
            selftext: Some("body".into()),
            comments: vec![
                RawComment::new("alice", "good")
                    .with_replies(vec![RawComment::new("bob", "bad")]),
                RawComment::new("carol", "meh"),
            ],
            ..RawThread::default()
        }
    }

    fn signals() -> PrecomputedSignals {
        PrecomputedSignals::default()
            .with_sentiment("Title\n\nbody", 0.6)
            .with_sentiment("good", 0.8)
            .with_sentiment("bad", -0.7)
            .with_sentiment("meh", 0.1)
    }

    #[test]
    fn test_small_thread_report() {
        let mut session = NormalizationSession::new();
        let report = ThreadAnalyzer::default()
            .analyze_raw(&small_thread(), &HashingEmbedder::default(), &signals(), &mut session)
            .unwrap();

        assert_eq!(report.comment_count, 3);
        assert_eq!(report.author_count, 3);
        assert_eq!(report.branch_count, 2);
        assert_eq!(report.max_depth, 2);
        assert_eq!(report.coalition.reason, MetricReason::C101_COALITION_INSUFFICIENT_COMMENTS);
        // bob flips at depth 2 on a 3-node path, carol never flips
        assert!((report.defection.value - (2.0 / 3.0 + 1.0) / 2.0).abs() < 1e-12);
        assert_eq!(report.reciprocity.value, 2.0);
        assert_eq!(session.observations, 0);
    }

    #[test]
    fn test_missing_signal_is_provider_error() {
        let err = ThreadAnalyzer::default()
            .analyze_raw(
                &small_thread(),
                &HashingEmbedder::default(),
                &PrecomputedSignals::default(),
                &mut NormalizationSession::new(),
            )
            .unwrap_err();
        assert!(matches!(err, crate::ThreadError::Provider(_)));
    }

    #[test]
    fn test_small_thread_ignores_partial_embeddings() {
        // embeddings are never requested for three comments
        let signals = signals().with_embedding("good", vec![1.0, 0.0]);
        let report = ThreadAnalyzer::default()
            .analyze_raw(&small_thread(), &signals, &signals, &mut NormalizationSession::new())
            .unwrap();
        assert_eq!(report.coalition.reason, MetricReason::C101_COALITION_INSUFFICIENT_COMMENTS);
    }

    #[test]
    fn test_prepare_does_not_touch_session() {
        let analyzer = ThreadAnalyzer::default();
        let prepared = analyzer
            .prepare_raw(&small_thread(), &HashingEmbedder::default(), &signals())
            .unwrap();
        assert_eq!(prepared.comment_count, 3);

        let mut session = NormalizationSession::new();
        let report = prepared.finish(&mut session);
        assert!(report.coalition.diversity.is_nan());
        assert!(session.is_empty());
    }
}
