//! Error types for threadsense
//!
//! Only genuinely malformed input or provider failures are errors.
//! "Cannot compute" outcomes are sentinel metric values, see `MetricReason`.

use thiserror::Error;

/// Result type alias for threadsense operations
pub type Result<T> = std::result::Result<T, ThreadError>;

/// Errors surfaced to the caller
#[derive(Error, Debug)]
pub enum ThreadError {
    /// A comment is missing a required field
    #[error("Malformed input at {path}: missing `{field}`")]
    MalformedInput { path: String, field: &'static str },

    /// Flat-list parent links never reach the post (cycle)
    #[error("{count} comment(s) unreachable from the post (cyclic parent links)")]
    UnreachableComments { count: usize },

    /// Comments and embeddings are not order-aligned
    #[error("Length mismatch: {comments} comments, {embeddings} embeddings")]
    LengthMismatch { comments: usize, embeddings: usize },

    /// Per-node sentiment scores do not cover the tree
    #[error("Score count mismatch: {nodes} nodes, {scores} scores")]
    ScoreCountMismatch { nodes: usize, scores: usize },

    /// Embeddings of different lengths in one analysis
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Cluster count must be at least 1
    #[error("Invalid cluster count: {0}")]
    InvalidClusterCount(usize),

    /// Embedding contains NaN or infinity
    #[error("Embedding {index} contains non-finite values")]
    NonFiniteEmbedding { index: usize },

    /// Opaque failure of an embedding or sentiment capability
    #[error("Provider error: {0}")]
    Provider(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThreadError {
    /// Build a missing-field error for a node path like `comments[2].replies[0]`
    pub fn missing(path: impl Into<String>, field: &'static str) -> Self {
        Self::MalformedInput {
            path: path.into(),
            field,
        }
    }

    /// True for errors caused by the caller's input rather than a provider
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. }
                | Self::UnreachableComments { .. }
                | Self::LengthMismatch { .. }
                | Self::ScoreCountMismatch { .. }
                | Self::DimensionMismatch { .. }
                | Self::InvalidClusterCount(_)
                | Self::NonFiniteEmbedding { .. }
                | Self::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_message() {
        let err = ThreadError::missing("comments[1]", "author");
        assert_eq!(err.to_string(), "Malformed input at comments[1]: missing `author`");
        assert!(err.is_input_error());
    }

    #[test]
    fn test_provider_is_not_input_error() {
        let err = ThreadError::Provider("timeout".into());
        assert!(!err.is_input_error());
    }
}
