//! Boundary shape of a scraped thread (post + comments)
//!
//! Fields a node must carry are still `Option` here so the tree builder
//! can report exactly which node is malformed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A post with its comment forest or flat comment list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawThread {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

/// One comment, nested (`replies`) or flat (`id` / `parent_id`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    /// `null`, missing and `[]` all mean "no replies"
    #[serde(default)]
    pub replies: Option<Vec<RawComment>>,
}

impl RawComment {
    /// Convenience constructor for nested input
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Attach replies
    pub fn with_replies(mut self, replies: Vec<RawComment>) -> Self {
        self.replies = Some(replies);
        self
    }

    /// Set flat-list links
    pub fn with_link(mut self, id: impl Into<String>, parent_id: Option<&str>) -> Self {
        self.id = Some(id.into());
        self.parent_id = parent_id.map(String::from);
        self
    }

    /// Replies as a slice, empty when absent
    pub fn replies(&self) -> &[RawComment] {
        self.replies.as_deref().unwrap_or(&[])
    }
}

impl RawThread {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> crate::Result<Self> {
        parse_unbounded(json.as_bytes())
    }

    /// Flat input: links present and no nesting anywhere at the top level
    pub fn is_flat(&self) -> bool {
        self.comments.iter().all(|c| c.replies().is_empty())
            && self.comments.iter().any(|c| c.parent_id.is_some())
    }
}

/// Parse JSON with no nesting limit
///
/// Every reply level nests an object and an array, so serde_json's default
/// limit of 128 stops near 63 replies deep. The stack grows on demand instead.
pub fn parse_unbounded<T: DeserializeOwned>(bytes: &[u8]) -> crate::Result<T> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}
