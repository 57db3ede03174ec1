//! Coalition engine: factions in embedding space and how far apart they sit
//!
//! Comments are clustered with seeded k-means. Each comment is scored by
//! how strongly it pulls toward its own centroid and away from the others;
//! the spread of those scores, min-max normalized against every analysis
//! that shared the same `NormalizationSession`, gives the diversity.

use tracing::debug;

use crate::core::kmeans::KMeans;
use crate::core::providers::{checked_embeddings, Embedder};
use crate::types::{
    AnalysisConfig, CoalitionAnalysis, MetricReason, NormalizationSession, PendingCoalition, Result, ThreadError,
};
use crate::{
    COALITION_INTRA_EPSILON, COALITION_LOW_SPREAD, COALITION_MIN_COMMENTS,
    COALITION_SIMILARITY_CEILING, KMEANS_MAX_ITERATIONS, KMEANS_RESTARTS, KMEANS_SEED,
};

/// Coalition diversity analyzer
#[derive(Debug, Clone, Copy)]
pub struct CoalitionEngine {
    pub min_comments: usize,
    pub similarity_ceiling: f64,
    pub low_spread: f64,
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
}

impl Default for CoalitionEngine {
    fn default() -> Self {
        Self {
            min_comments: COALITION_MIN_COMMENTS,
            similarity_ceiling: COALITION_SIMILARITY_CEILING,
            low_spread: COALITION_LOW_SPREAD,
            seed: KMEANS_SEED,
            restarts: KMEANS_RESTARTS,
            max_iterations: KMEANS_MAX_ITERATIONS,
        }
    }
}

impl CoalitionEngine {
    /// Create new engine with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine using the k-means settings of a config
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            seed: config.kmeans_seed,
            restarts: config.kmeans_restarts,
            max_iterations: config.kmeans_max_iterations,
            ..Self::default()
        }
    }

    /// Cluster, score and normalize
    ///
    /// Degenerate input is checked in order: too few comments (NaN),
    /// a single possible cluster (NaN), near-duplicates (0.0).
    pub fn analyze(
        &self,
        comments: &[String],
        embeddings: &[Vec<f32>],
        k: usize,
        session: &mut NormalizationSession,
    ) -> Result<CoalitionAnalysis> {
        Ok(self.score(comments, embeddings, k)?.finish(session))
    }

    /// Embed only when the thread is large enough to cluster
    pub fn score_with(&self, comments: &[String], embedder: &dyn Embedder, k: usize) -> Result<PendingCoalition> {
        if k == 0 {
            return Err(ThreadError::InvalidClusterCount(k));
        }
        if comments.len() < self.min_comments {
            return Ok(self.insufficient(comments.len()));
        }
        let embeddings = checked_embeddings(embedder, comments)?;
        self.score(comments, &embeddings, k)
    }

    /// Everything `analyze` does except touching the session
    pub fn score(&self, comments: &[String], embeddings: &[Vec<f32>], k: usize) -> Result<PendingCoalition> {
        let points = validate(comments, embeddings, k)?;
        let n = points.len();
        let clusters = k.min((n.saturating_sub(1)).max(2));

        if n < self.min_comments {
            return Ok(self.insufficient(n));
        }
        if clusters <= 1 {
            debug!(k, "coalition: single cluster requested");
            return Ok(PendingCoalition::new(CoalitionAnalysis::degenerate(
                n,
                f64::NAN,
                MetricReason::C102_COALITION_SINGLE_CLUSTER,
            )));
        }

        let mean_similarity = mean_pairwise_similarity(&points);
        if mean_similarity > self.similarity_ceiling {
            debug!(mean_similarity, "coalition: near-duplicate comments");
            let mut analysis = CoalitionAnalysis::degenerate(n, 0.0, MetricReason::C103_COALITION_NEAR_DUPLICATE);
            analysis.mean_similarity = Some(mean_similarity);
            return Ok(PendingCoalition::new(analysis));
        }

        let fit = KMeans::new(clusters)
            .with_seed(self.seed)
            .with_restarts(self.restarts)
            .with_max_iterations(self.max_iterations)
            .fit(&points);

        if fit.centroids.len() < 2 {
            debug!("coalition: k-means produced one cluster");
            let mut analysis = CoalitionAnalysis::degenerate(n, f64::NAN, MetricReason::C102_COALITION_SINGLE_CLUSTER);
            analysis.mean_similarity = Some(mean_similarity);
            return Ok(PendingCoalition::new(analysis));
        }

        let comment_scores: Vec<f64> = points
            .iter()
            .zip(&fit.labels)
            .map(|(p, &label)| comment_score(p, &fit.centroids, label))
            .collect();
        let spread = std_dev(&comment_scores);

        // computed diversity stays NaN until `finish` normalizes it
        let (diversity, reason) = if spread < self.low_spread {
            debug!(spread, "coalition: low spread");
            (0.0, MetricReason::C104_COALITION_LOW_SPREAD)
        } else {
            (f64::NAN, MetricReason::C100_COALITION_COMPUTED)
        };

        Ok(PendingCoalition::new(CoalitionAnalysis {
            labels: fit.labels,
            comment_scores,
            diversity,
            raw_spread: Some(spread),
            clusters: fit.centroids.len(),
            mean_similarity: Some(mean_similarity),
            reason,
        }))
    }

    fn insufficient(&self, n: usize) -> PendingCoalition {
        debug!(comments = n, "coalition: insufficient comments");
        PendingCoalition::new(CoalitionAnalysis::degenerate(
            n,
            f64::NAN,
            MetricReason::C101_COALITION_INSUFFICIENT_COMMENTS,
        ))
    }
}

/// Pull toward own centroid minus pull toward the others
///
/// `intra = cos(e, own)`, `inter = -intra - Σ cos(e, other)`,
/// score = `inter / (1 / (intra + ε))`.
pub fn comment_score(embedding: &[f64], centroids: &[Vec<f64>], own: usize) -> f64 {
    let intra = cosine_similarity(embedding, &centroids[own]);
    let intra_score = 1.0 / (intra + COALITION_INTRA_EPSILON);

    let others: f64 = centroids
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != own)
        .map(|(_, c)| cosine_similarity(embedding, c))
        .sum();
    let inter_score = -intra - others;

    inter_score / intra_score
}

/// Cosine similarity; 0.0 when either vector is all zeros
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

/// Mean of the full N×N cosine matrix, diagonal included
pub fn mean_pairwise_similarity(points: &[Vec<f64>]) -> f64 {
    let n = points.len();
    if n == 0 {
        return 0.0;
    }
    let mut total = 0.0;
    for (i, a) in points.iter().enumerate() {
        total += cosine_similarity(a, a);
        for b in &points[i + 1..] {
            total += 2.0 * cosine_similarity(a, b);
        }
    }
    total / (n * n) as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Check alignment, k, dimensions and finiteness; widen to f64
fn validate(comments: &[String], embeddings: &[Vec<f32>], k: usize) -> Result<Vec<Vec<f64>>> {
    if comments.len() != embeddings.len() {
        return Err(ThreadError::LengthMismatch {
            comments: comments.len(),
            embeddings: embeddings.len(),
        });
    }
    if k == 0 {
        return Err(ThreadError::InvalidClusterCount(k));
    }

    let expected = embeddings.first().map_or(0, Vec::len);
    embeddings
        .iter()
        .enumerate()
        .map(|(index, e)| {
            if e.len() != expected {
                return Err(ThreadError::DimensionMismatch {
                    expected,
                    actual: e.len(),
                });
            }
            if e.iter().any(|x| !x.is_finite()) {
                return Err(ThreadError::NonFiniteEmbedding { index });
            }
            Ok(e.iter().map(|&x| x as f64).collect())
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
