//! Threadsense: structural signals for threaded discussions
//!
//! Turns a normalized comment tree (plus per-comment embeddings and
//! sentiment scores) into four structural metrics:
//! coalition diversity, one-sidedness, defection and resilience.

pub mod core;
pub mod types;

pub use types::{Result, ThreadError};

// =============================================================================
// SENTIMENT PROPAGATION
// =============================================================================

/// |raw sentiment| below this inherits the parent's effective sentiment
pub const NEUTRAL_THRESHOLD: f64 = 0.3;

/// Resilience results inside [-dead_zone, dead_zone] carry no signal
pub const RESILIENCE_DEAD_ZONE: f64 = 0.1;

// =============================================================================
// COALITION
// =============================================================================

/// Default number of factions requested from k-means
pub const DEFAULT_CLUSTERS: usize = 3;

/// Below this many comments coalition diversity is not computed
pub const COALITION_MIN_COMMENTS: usize = 10;

/// Mean pairwise cosine similarity above this forces diversity = 0
pub const COALITION_SIMILARITY_CEILING: f64 = 0.8;

/// Std-dev of comment scores below this is treated as homogeneous
pub const COALITION_LOW_SPREAD: f64 = 0.05;

/// Guards 1 / intra-similarity
pub const COALITION_INTRA_EPSILON: f64 = 1e-10;

/// Fixed k-means seed - results must be reproducible
pub const KMEANS_SEED: u64 = 42;

/// Independent k-means++ restarts, best inertia wins
pub const KMEANS_RESTARTS: usize = 10;

/// Lloyd iterations per restart
pub const KMEANS_MAX_ITERATIONS: usize = 300;

/// Centroid movement below this stops a restart early
pub const KMEANS_TOLERANCE: f64 = 1e-8;

// =============================================================================
// ONE-SIDEDNESS
// =============================================================================

/// Guards the Gini denominator
pub const GINI_EPSILON: f64 = 1e-9;

// =============================================================================
// TREE NORMALIZATION
// =============================================================================

/// Comment bodies that mark a removed comment
pub const PLACEHOLDER_BODIES: [&str; 2] = ["[removed]", "[deleted]"];

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.1.0";
