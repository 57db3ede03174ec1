//! Tree builder: normalizes a scraped thread into a `CommentTree`
//!
//! Accepts a nested forest (`replies`) or a flat list (`id` / `parent_id`).
//! Placeholder comments are dropped and their replies move up to the
//! nearest surviving ancestor.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{CommentTree, NodeId, RawComment, RawThread, Result, ThreadError, ROOT};
use crate::PLACEHOLDER_BODIES;

/// Builds `CommentTree`s from raw threads
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    placeholders: Vec<String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Builder with the default placeholder markers
    pub fn new() -> Self {
        Self {
            placeholders: PLACEHOLDER_BODIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builder with custom placeholder markers
    pub fn with_placeholders(placeholders: Vec<String>) -> Self {
        Self { placeholders }
    }

    /// Build a tree from either input shape
    pub fn build(&self, raw: &RawThread) -> Result<CommentTree> {
        let mut tree = CommentTree::with_root(
            raw.author.clone(),
            post_body(raw),
            raw.score.unwrap_or(0),
        );

        let dropped = if raw.is_flat() {
            self.build_flat(&mut tree, &raw.comments)?
        } else {
            self.build_nested(&mut tree, &raw.comments)?
        };

        debug!(
            comments = tree.comment_count(),
            dropped,
            "built comment tree"
        );
        Ok(tree)
    }

    /// Parse JSON and build
    pub fn build_json(&self, json: &str) -> Result<CommentTree> {
        self.build(&RawThread::from_json(json)?)
    }

    fn is_placeholder(&self, body: &str) -> bool {
        self.placeholders.iter().any(|p| p == body)
    }

    fn build_nested(&self, tree: &mut CommentTree, comments: &[RawComment]) -> Result<usize> {
        let mut dropped = 0;
        // (comment, surviving ancestor, path for error messages)
        let mut stack: Vec<(&RawComment, NodeId, String)> = comments
            .iter()
            .enumerate()
            .rev()
            .map(|(i, c)| (c, ROOT, format!("comments[{}]", i)))
            .collect();

        while let Some((comment, attach_to, path)) = stack.pop() {
            let (author, body) = required_fields(comment, &path)?;

            let parent = if self.is_placeholder(body) {
                dropped += 1;
                attach_to
            } else {
                tree.attach(attach_to, author.to_string(), body.to_string(), comment.score.unwrap_or(0))
            };

            for (i, reply) in comment.replies().iter().enumerate().rev() {
                stack.push((reply, parent, format!("{}.replies[{}]", path, i)));
            }
        }

        Ok(dropped)
    }

    fn build_flat(&self, tree: &mut CommentTree, comments: &[RawComment]) -> Result<usize> {
        let mut by_id: HashMap<&str, usize> = HashMap::new();
        for (i, comment) in comments.iter().enumerate() {
            required_fields(comment, &format!("comments[{}]", i))?;
            if let Some(id) = comment.id.as_deref() {
                by_id.entry(strip_kind(id)).or_insert(i);
            }
        }

        let mut top_level = Vec::new();
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, comment) in comments.iter().enumerate() {
            let parent = comment
                .parent_id
                .as_deref()
                .and_then(|p| by_id.get(strip_kind(p)).copied());
            match parent {
                Some(p) => children.entry(p).or_default().push(i),
                None => top_level.push(i),
            }
        }

        let mut visited = vec![false; comments.len()];
        let mut dropped = 0;
        let mut stack: Vec<(usize, NodeId)> = top_level.iter().rev().map(|&i| (i, ROOT)).collect();

        while let Some((index, attach_to)) = stack.pop() {
            if visited[index] {
                continue;
            }
            visited[index] = true;

            let comment = &comments[index];
            let (author, body) = required_fields(comment, &format!("comments[{}]", index))?;
            let parent = if self.is_placeholder(body) {
                dropped += 1;
                attach_to
            } else {
                tree.attach(attach_to, author.to_string(), body.to_string(), comment.score.unwrap_or(0))
            };

            if let Some(kids) = children.get(&index) {
                for &kid in kids.iter().rev() {
                    stack.push((kid, parent));
                }
            }
        }

        let unreachable = visited.iter().filter(|v| !**v).count();
        if unreachable > 0 {
            return Err(ThreadError::UnreachableComments { count: unreachable });
        }
        Ok(dropped)
    }
}

/// Title and selftext joined by a blank line
fn post_body(raw: &RawThread) -> String {
    [raw.title.as_deref(), raw.selftext.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn required_fields<'a>(comment: &'a RawComment, path: &str) -> Result<(&'a str, &'a str)> {
    let author = comment
        .author
        .as_deref()
        .ok_or_else(|| ThreadError::missing(path, "author"))?;
    let body = comment
        .body
        .as_deref()
        .ok_or_else(|| ThreadError::missing(path, "body"))?;
    Ok((author, body))
}

/// `t1_abc` / `t3_abc` -> `abc`
fn strip_kind(id: &str) -> &str {
    match id.split_once('_') {
        Some((kind, rest)) if kind.len() == 2 && kind.starts_with('t') => rest,
        _ => id,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(comments: Vec<RawComment>) -> RawThread {
        RawThread {
            title: Some("Title".into()),
            selftext: Some("Body".into()),
            author: Some("op".into()),
            score: Some(12),
            comments,
        }
    }

    #[test]
    fn test_root_body_concatenation() {
        let tree = TreeBuilder::new().build(&thread(vec![])).unwrap();
        assert_eq!(tree.root().body, "Title\n\nBody");
        assert_eq!(tree.root().author.as_deref(), Some("op"));
        assert_eq!(tree.root().score, 12);
    }

    #[test]
    fn test_missing_selftext() {
        let raw = RawThread {
            title: Some("Only title".into()),
            ..Default::default()
        };
        let tree = TreeBuilder::new().build(&raw).unwrap();
        assert_eq!(tree.root().body, "Only title");
    }

    #[test]
    fn test_missing_author_is_malformed() {
        let mut bad = RawComment::new("x", "hello");
        bad.author = None;
        let raw = thread(vec![RawComment::new("a", "fine").with_replies(vec![bad])]);

        let err = TreeBuilder::new().build(&raw).unwrap_err();
        match err {
            ThreadError::MalformedInput { path, field } => {
                assert_eq!(path, "comments[0].replies[0]");
                assert_eq!(field, "author");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let mut bad = RawComment::new("x", "hello");
        bad.body = None;
        let err = TreeBuilder::new().build(&thread(vec![bad])).unwrap_err();
        assert!(matches!(err, ThreadError::MalformedInput { field: "body", .. }));
    }

    #[test]
    fn test_removed_comment_reattaches_children() {
        // a -> [removed] -> b
        let raw = thread(vec![RawComment::new("u1", "a").with_replies(vec![
            RawComment::new("[deleted]", "[removed]")
                .with_replies(vec![RawComment::new("u2", "b")]),
        ])]);

        let tree = TreeBuilder::new().build(&raw).unwrap();
        assert_eq!(tree.comment_count(), 2);

        let b = tree.flatten()[1];
        assert_eq!(b.body, "b");
        assert_eq!(b.parent, Some(1));
        assert_eq!(b.depth, 2);
    }

    #[test]
    fn test_removed_top_level_promotes_replies() {
        let raw = thread(vec![
            RawComment::new("x", "[deleted]").with_replies(vec![RawComment::new("u2", "orphan")]),
            RawComment::new("u3", "sibling"),
        ]);
        let tree = TreeBuilder::new().build(&raw).unwrap();
        let bodies: Vec<&str> = tree.flatten().iter().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, vec!["orphan", "sibling"]);
        assert_eq!(tree.root().children.len(), 2);
    }

    #[test]
    fn test_flat_matches_nested() {
        let nested = thread(vec![
            RawComment::new("u1", "a").with_replies(vec![
                RawComment::new("u2", "b"),
                RawComment::new("u3", "c"),
            ]),
            RawComment::new("u4", "d"),
        ]);
        let flat = thread(vec![
            RawComment::new("u1", "a").with_link("a1", Some("t3_post")),
            RawComment::new("u4", "d").with_link("d1", Some("t3_post")),
            RawComment::new("u2", "b").with_link("b1", Some("t1_a1")),
            RawComment::new("u3", "c").with_link("c1", Some("t1_a1")),
        ]);

        let builder = TreeBuilder::new();
        assert_eq!(builder.build(&nested).unwrap(), builder.build(&flat).unwrap());
    }

    #[test]
    fn test_flat_cycle_is_rejected() {
        let raw = thread(vec![
            RawComment::new("u1", "top").with_link("a", None),
            RawComment::new("u2", "x").with_link("b", Some("t1_c")),
            RawComment::new("u3", "y").with_link("c", Some("t1_b")),
        ]);
        let err = TreeBuilder::new().build(&raw).unwrap_err();
        assert!(matches!(err, ThreadError::UnreachableComments { count: 2 }));
    }

    #[test]
    fn test_custom_placeholders() {
        let builder = TreeBuilder::with_placeholders(vec!["[gone]".into()]);
        let raw = thread(vec![RawComment::new("u", "[gone]"), RawComment::new("u", "[removed]")]);
        let tree = builder.build(&raw).unwrap();
        assert_eq!(tree.comment_count(), 1);
        assert_eq!(tree.flatten()[0].body, "[removed]");
    }

    #[test]
    fn test_strip_kind() {
        assert_eq!(strip_kind("t1_abc"), "abc");
        assert_eq!(strip_kind("t3_xyz"), "xyz");
        assert_eq!(strip_kind("plain"), "plain");
        assert_eq!(strip_kind("user_name"), "user_name");
    }
}
