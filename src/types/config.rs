//! Tunable analysis parameters

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_CLUSTERS, KMEANS_MAX_ITERATIONS, KMEANS_RESTARTS, KMEANS_SEED,
    NEUTRAL_THRESHOLD, PLACEHOLDER_BODIES, RESILIENCE_DEAD_ZONE,
};

/// Parameters shared by the engines; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub neutral_threshold: f64,
    pub resilience_dead_zone: f64,
    pub clusters: usize,
    pub kmeans_seed: u64,
    pub kmeans_restarts: usize,
    pub kmeans_max_iterations: usize,
    pub placeholder_bodies: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            neutral_threshold: NEUTRAL_THRESHOLD,
            resilience_dead_zone: RESILIENCE_DEAD_ZONE,
            clusters: DEFAULT_CLUSTERS,
            kmeans_seed: KMEANS_SEED,
            kmeans_restarts: KMEANS_RESTARTS,
            kmeans_max_iterations: KMEANS_MAX_ITERATIONS,
            placeholder_bodies: PLACEHOLDER_BODIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(r#"{"clusters": 5}"#).unwrap();
        assert_eq!(config.clusters, 5);
        assert_eq!(config.neutral_threshold, 0.3);
        assert_eq!(config.kmeans_seed, 42);
        assert_eq!(config.placeholder_bodies, vec!["[removed]", "[deleted]"]);
    }
}
