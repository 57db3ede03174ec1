//! Per-thread report combining every metric

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tracing::info;

use crate::types::{CoalitionAnalysis, MetricResult, NormalizationSession, PendingCoalition};

/// Everything the analyzer computes for one thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadReport {
    pub generated_at: DateTime<Utc>,
    pub comment_count: usize,
    pub author_count: usize,
    pub branch_count: usize,
    pub max_depth: usize,
    pub coalition: CoalitionAnalysis,
    pub one_sidedness: MetricResult,
    pub defection: MetricResult,
    pub resilience: MetricResult,
    pub reciprocity: MetricResult,
}

impl ThreadReport {
    /// Headline metrics with their labels
    pub fn metrics(&self) -> [(&'static str, MetricResult); 5] {
        [
            ("coalition", self.coalition.metric()),
            ("one_sidedness", self.one_sidedness),
            ("defection", self.defection),
            ("resilience", self.resilience),
            ("reciprocity", self.reciprocity),
        ]
    }

    /// Single-line parseable summary
    pub fn to_parseable_string(&self) -> String {
        let metrics = self
            .metrics()
            .iter()
            .map(|(name, m)| format!("{}={}", name, m.display_value()))
            .collect::<Vec<_>>()
            .join(" | ");
        format!(
            "comments={} | authors={} | branches={} | {}",
            self.comment_count, self.author_count, self.branch_count, metrics
        )
    }
}

/// A report whose coalition diversity still needs the session
///
/// All the expensive work (sentiment, embeddings, k-means) is done by the
/// time this exists; `finish` only records one spread.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub generated_at: DateTime<Utc>,
    pub comment_count: usize,
    pub author_count: usize,
    pub branch_count: usize,
    pub max_depth: usize,
    pub coalition: PendingCoalition,
    pub one_sidedness: MetricResult,
    pub defection: MetricResult,
    pub resilience: MetricResult,
    pub reciprocity: MetricResult,
}

impl PreparedReport {
    /// Normalize coalition diversity and produce the final report
    pub fn finish(self, session: &mut NormalizationSession) -> ThreadReport {
        let report = ThreadReport {
            generated_at: self.generated_at,
            comment_count: self.comment_count,
            author_count: self.author_count,
            branch_count: self.branch_count,
            max_depth: self.max_depth,
            coalition: self.coalition.finish(session),
            one_sidedness: self.one_sidedness,
            defection: self.defection,
            resilience: self.resilience,
            reciprocity: self.reciprocity,
        };

        info!(
            comments = report.comment_count,
            authors = report.author_count,
            coalition = report.coalition.reason.code(),
            defection = report.defection.reason.code(),
            resilience = report.resilience.reason.code(),
            "thread analyzed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricReason;

    fn report() -> ThreadReport {
        ThreadReport {
            generated_at: Utc::now(),
            comment_count: 4,
            author_count: 2,
            branch_count: 3,
            max_depth: 2,
            coalition: CoalitionAnalysis::degenerate(
                4,
                f64::NAN,
                MetricReason::C101_COALITION_INSUFFICIENT_COMMENTS,
            ),
            one_sidedness: MetricResult::computed(0.25, MetricReason::G400_ONESIDEDNESS_COMPUTED, 2),
            defection: MetricResult::computed(0.75, MetricReason::D200_DEFECTION_COMPUTED, 3),
            resilience: MetricResult::sentinel(f64::NAN, MetricReason::S301_RESILIENCE_NO_DEFECTION),
            reciprocity: MetricResult::computed(1.0, MetricReason::P500_RECIPROCITY_COMPUTED, 1),
        }
    }

    #[test]
    fn test_parseable_string() {
        assert_eq!(
            report().to_parseable_string(),
            "comments=4 | authors=2 | branches=3 | coalition=n/a | one_sidedness=0.250 | \
             defection=0.750 | resilience=n/a | reciprocity=1.000"
        );
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let json = serde_json::to_value(report()).unwrap();
        assert!(json["coalition"]["diversity"].is_null());
        assert!(json["resilience"]["value"].is_null());
        assert_eq!(json["defection"]["value"], 0.75);
    }
}
