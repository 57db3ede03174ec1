//! Core types for threadsense

mod coalition;
mod comment;
mod config;
mod error;
pub(crate) mod metric;
mod raw;
mod reason;
mod report;
mod sentiment;

pub use coalition::{CoalitionAnalysis, NormalizationSession, PendingCoalition, SharedNormalization};
pub use comment::{CommentNode, CommentTree, NodeId, ROOT};
pub use config::AnalysisConfig;
pub use error::{Result, ThreadError};
pub use metric::MetricResult;
pub use raw::{parse_unbounded, RawComment, RawThread};
pub use reason::MetricReason;
pub use report::{PreparedReport, ThreadReport};
pub use sentiment::{Branch, BranchStep, NodeSentiment, SentimentTrace};
