//! Coalition analysis results and the cross-thread normalization session

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::types::metric::nan_as_null;
use crate::types::{MetricReason, MetricResult};

/// Output of `CoalitionEngine::analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoalitionAnalysis {
    /// Faction label per comment (all zero for degenerate input)
    pub labels: Vec<usize>,
    /// Pull-toward-own-faction score per comment
    pub comment_scores: Vec<f64>,
    /// NaN, 0.0, or 1 - normalized spread
    #[serde(with = "nan_as_null")]
    pub diversity: f64,
    /// Std-dev of comment scores before normalization
    pub raw_spread: Option<f64>,
    /// Number of non-empty clusters
    pub clusters: usize,
    /// Mean of the full pairwise cosine matrix
    pub mean_similarity: Option<f64>,
    pub reason: MetricReason,
}

impl CoalitionAnalysis {
    /// All-zero labels and scores with a sentinel diversity
    pub fn degenerate(len: usize, diversity: f64, reason: MetricReason) -> Self {
        Self {
            labels: vec![0; len],
            comment_scores: vec![0.0; len],
            diversity,
            raw_spread: None,
            clusters: 0,
            mean_similarity: None,
            reason,
        }
    }

    /// Diversity as a metric result
    pub fn metric(&self) -> MetricResult {
        if self.reason.is_sentinel() {
            MetricResult::sentinel(self.diversity, self.reason)
        } else {
            MetricResult::computed(self.diversity, self.reason, self.labels.len())
        }
    }
}

/// Coalition result computed without a session
///
/// Only a computed spread still needs normalizing; every sentinel outcome
/// is already final. `finish` is the single point that touches the
/// session, so callers sharing one can lock around it alone.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCoalition {
    analysis: CoalitionAnalysis,
}

impl PendingCoalition {
    /// Wrap an analysis; a `C100` result must carry `raw_spread`
    pub fn new(analysis: CoalitionAnalysis) -> Self {
        Self { analysis }
    }

    /// Whether `finish` will record anything in the session
    pub fn needs_session(&self) -> bool {
        self.analysis.reason == MetricReason::C100_COALITION_COMPUTED && self.analysis.raw_spread.is_some()
    }

    pub fn raw_spread(&self) -> Option<f64> {
        self.analysis.raw_spread
    }

    /// Normalize the spread against `session` (if needed) and return the result
    pub fn finish(self, session: &mut NormalizationSession) -> CoalitionAnalysis {
        let mut analysis = self.analysis;
        if analysis.reason == MetricReason::C100_COALITION_COMPUTED {
            if let Some(spread) = analysis.raw_spread {
                analysis.diversity = 1.0 - session.observe(spread);
            }
        }
        analysis
    }
}

/// Running min/max of raw coalition spread
///
/// Min only decreases and max only increases. Reuse one session to
/// calibrate threads against each other; use a fresh one per call for
/// independent results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationSession {
    pub min_score: f64,
    pub max_score: f64,
    pub observations: u64,
}

impl Default for NormalizationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizationSession {
    /// Empty session: min = +inf, max = -inf
    pub fn new() -> Self {
        Self {
            min_score: f64::INFINITY,
            max_score: f64::NEG_INFINITY,
            observations: 0,
        }
    }

    /// Record a raw spread and return it min-max normalized
    pub fn observe(&mut self, raw: f64) -> f64 {
        if raw.is_nan() {
            return 0.0;
        }
        self.min_score = self.min_score.min(raw);
        self.max_score = self.max_score.max(raw);
        self.observations += 1;
        self.normalize(raw)
    }

    /// Normalize without recording; 0.0 until min < max
    pub fn normalize(&self, raw: f64) -> f64 {
        if self.max_score > self.min_score {
            (raw - self.min_score) / (self.max_score - self.min_score)
        } else {
            0.0
        }
    }

    /// Nothing observed yet
    pub fn is_empty(&self) -> bool {
        self.observations == 0
    }

    /// Wrap for sharing between threads
    pub fn shared(self) -> SharedNormalization {
        Arc::new(Mutex::new(self))
    }

    /// Lock a shared session
    ///
    /// A panic elsewhere cannot leave the bounds half-updated, so a
    /// poisoned lock is recovered rather than failing every later caller.
    pub fn lock(shared: &SharedNormalization) -> MutexGuard<'_, NormalizationSession> {
        shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide session guarded by a lock
pub type SharedNormalization = Arc<Mutex<NormalizationSession>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_normalizes_to_zero() {
        let mut session = NormalizationSession::new();
        assert_eq!(session.observe(0.4), 0.0);
        assert_eq!(session.min_score, 0.4);
        assert_eq!(session.max_score, 0.4);
    }

    #[test]
    fn test_bounds_are_monotonic() {
        let mut session = NormalizationSession::new();
        session.observe(0.5);
        session.observe(0.2);
        session.observe(0.3);
        assert_eq!(session.min_score, 0.2);
        assert_eq!(session.max_score, 0.5);
        assert_eq!(session.observations, 3);

        // 0.3 sits a third of the way between 0.2 and 0.5
        assert!((session.normalize(0.3) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(session.observe(0.5), 1.0);
    }

    #[test]
    fn test_nan_is_not_recorded() {
        let mut session = NormalizationSession::new();
        assert_eq!(session.observe(f64::NAN), 0.0);
        assert!(session.is_empty());
    }

    fn computed(spread: f64) -> PendingCoalition {
        let mut analysis = CoalitionAnalysis::degenerate(12, f64::NAN, MetricReason::C100_COALITION_COMPUTED);
        analysis.raw_spread = Some(spread);
        PendingCoalition::new(analysis)
    }

    #[test]
    fn test_sentinel_finish_leaves_session_alone() {
        let pending = PendingCoalition::new(CoalitionAnalysis::degenerate(
            4,
            f64::NAN,
            MetricReason::C101_COALITION_INSUFFICIENT_COMMENTS,
        ));
        assert!(!pending.needs_session());

        let mut session = NormalizationSession::new();
        let analysis = pending.finish(&mut session);
        assert!(analysis.diversity.is_nan());
        assert!(session.is_empty());
    }

    #[test]
    fn test_computed_finish_observes_spread() {
        let mut session = NormalizationSession::new();
        assert!(computed(0.2).needs_session());
        assert_eq!(computed(0.2).finish(&mut session).diversity, 1.0);
        assert_eq!(computed(0.4).finish(&mut session).diversity, 0.0);
        assert_eq!(session.observations, 2);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let shared = NormalizationSession::new().shared();
        NormalizationSession::lock(&shared).observe(0.3);

        let poisoner = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("worker died holding the session");
        })
        .join();
        assert!(shared.is_poisoned());

        let mut session = NormalizationSession::lock(&shared);
        assert_eq!(session.observations, 1);
        session.observe(0.6);
        assert_eq!(session.max_score, 0.6);
    }
}
