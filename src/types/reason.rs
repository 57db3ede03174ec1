//! Reason codes for metric outcomes
//!
//! Every metric carries one of these so a sentinel value (NaN / 0.0)
//! can be told apart from a computed one.

use serde::{Deserialize, Serialize};

/// Why a metric has the value it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum MetricReason {
    // =========================================================================
    // C1xx: Coalition diversity
    // =========================================================================
    /// Clustered, scored and normalized
    C100_COALITION_COMPUTED,
    /// Fewer than 10 comments
    C101_COALITION_INSUFFICIENT_COMMENTS,
    /// Only one faction could be formed
    C102_COALITION_SINGLE_CLUSTER,
    /// Mean pairwise similarity above ceiling
    C103_COALITION_NEAR_DUPLICATE,
    /// Score spread below floor
    C104_COALITION_LOW_SPREAD,

    // =========================================================================
    // D2xx: Defection
    // =========================================================================
    /// Mean normalized first-defection depth
    D200_DEFECTION_COMPUTED,
    /// Thread has no comments
    D201_DEFECTION_NO_BRANCHES,

    // =========================================================================
    // S3xx: Resilience
    // =========================================================================
    /// Mean post-defection sentiment
    S300_RESILIENCE_COMPUTED,
    /// No branch ever turned negative
    S301_RESILIENCE_NO_DEFECTION,
    /// Mean inside the dead zone
    S302_RESILIENCE_DEAD_ZONE,

    // =========================================================================
    // G4xx: One-sidedness
    // =========================================================================
    /// Gini coefficient over author counts
    G400_ONESIDEDNESS_COMPUTED,
    /// Zero or one author
    G401_ONESIDEDNESS_SINGLE_AUTHOR,

    // =========================================================================
    // P5xx: Reciprocity
    // =========================================================================
    /// Mean raw first-flip depth
    P500_RECIPROCITY_COMPUTED,
    /// No raw sign flip anywhere
    P501_RECIPROCITY_NO_DEFECTION,
}

impl MetricReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::C100_COALITION_COMPUTED => "C100_COALITION_COMPUTED",
            Self::C101_COALITION_INSUFFICIENT_COMMENTS => "C101_COALITION_INSUFFICIENT_COMMENTS",
            Self::C102_COALITION_SINGLE_CLUSTER => "C102_COALITION_SINGLE_CLUSTER",
            Self::C103_COALITION_NEAR_DUPLICATE => "C103_COALITION_NEAR_DUPLICATE",
            Self::C104_COALITION_LOW_SPREAD => "C104_COALITION_LOW_SPREAD",
            Self::D200_DEFECTION_COMPUTED => "D200_DEFECTION_COMPUTED",
            Self::D201_DEFECTION_NO_BRANCHES => "D201_DEFECTION_NO_BRANCHES",
            Self::S300_RESILIENCE_COMPUTED => "S300_RESILIENCE_COMPUTED",
            Self::S301_RESILIENCE_NO_DEFECTION => "S301_RESILIENCE_NO_DEFECTION",
            Self::S302_RESILIENCE_DEAD_ZONE => "S302_RESILIENCE_DEAD_ZONE",
            Self::G400_ONESIDEDNESS_COMPUTED => "G400_ONESIDEDNESS_COMPUTED",
            Self::G401_ONESIDEDNESS_SINGLE_AUTHOR => "G401_ONESIDEDNESS_SINGLE_AUTHOR",
            Self::P500_RECIPROCITY_COMPUTED => "P500_RECIPROCITY_COMPUTED",
            Self::P501_RECIPROCITY_NO_DEFECTION => "P501_RECIPROCITY_NO_DEFECTION",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::C100_COALITION_COMPUTED => "Coalition diversity computed",
            Self::C101_COALITION_INSUFFICIENT_COMMENTS => "Too few comments to cluster",
            Self::C102_COALITION_SINGLE_CLUSTER => "Only one coalition possible",
            Self::C103_COALITION_NEAR_DUPLICATE => "Comments are near-duplicates",
            Self::C104_COALITION_LOW_SPREAD => "Comment scores barely vary",
            Self::D200_DEFECTION_COMPUTED => "Defection computed",
            Self::D201_DEFECTION_NO_BRANCHES => "No comment branches",
            Self::S300_RESILIENCE_COMPUTED => "Resilience computed",
            Self::S301_RESILIENCE_NO_DEFECTION => "No negative defection",
            Self::S302_RESILIENCE_DEAD_ZONE => "Resilience too close to zero",
            Self::G400_ONESIDEDNESS_COMPUTED => "One-sidedness computed",
            Self::G401_ONESIDEDNESS_SINGLE_AUTHOR => "At most one author",
            Self::P500_RECIPROCITY_COMPUTED => "Reciprocity computed",
            Self::P501_RECIPROCITY_NO_DEFECTION => "No sentiment sign flip",
        }
    }

    /// "Cannot compute" or forced value rather than a computed one
    pub fn is_sentinel(&self) -> bool {
        !matches!(
            self,
            Self::C100_COALITION_COMPUTED
                | Self::D200_DEFECTION_COMPUTED
                | Self::S300_RESILIENCE_COMPUTED
                | Self::G400_ONESIDEDNESS_COMPUTED
                | Self::P500_RECIPROCITY_COMPUTED
        )
    }
}

impl std::fmt::Display for MetricReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
