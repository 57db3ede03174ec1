//! Comment tree stored as an arena
//!
//! Node 0 is the post. Every other node is a surviving comment with a
//! parent index; children keep their original order. Traversals use an
//! explicit stack so deep reply chains never exhaust the call stack.

use serde::{Deserialize, Serialize};

use crate::types::RawThread;

/// Index of a node in a `CommentTree`
pub type NodeId = usize;

/// The post pseudo-node is always at index 0
pub const ROOT: NodeId = 0;

/// One node of the thread (post or comment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    /// Comment author; `None` only for a post without author
    pub author: Option<String>,
    pub body: String,
    /// Vote count, may be negative
    pub score: i64,
    pub parent: Option<NodeId>,
    /// Replies in original order (empty for leaves, never absent)
    pub children: Vec<NodeId>,
    /// Distance from the post in the surviving tree
    pub depth: usize,
}

impl CommentNode {
    /// A node with no replies
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Normalized thread: post plus the surviving reply tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentTree {
    nodes: Vec<CommentNode>,
}

impl CommentTree {
    /// Normalize a raw thread with the default placeholder markers
    pub fn build(raw: &RawThread) -> crate::Result<Self> {
        crate::core::TreeBuilder::new().build(raw)
    }

    /// Start a tree holding only the post
    pub(crate) fn with_root(author: Option<String>, body: String, score: i64) -> Self {
        Self {
            nodes: vec![CommentNode {
                author,
                body,
                score,
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
        }
    }

    /// Append a comment under `parent`, returning its id
    pub(crate) fn attach(&mut self, parent: NodeId, author: String, body: String, score: i64) -> NodeId {
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(CommentNode {
            author: Some(author),
            body,
            score,
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// The post pseudo-node
    pub fn root(&self) -> &CommentNode {
        &self.nodes[ROOT]
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&CommentNode> {
        self.nodes.get(id)
    }

    /// Total nodes including the post
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true; the post is always present
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of surviving comments (post excluded)
    pub fn comment_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Node ids in pre-order (node before children, children in order)
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Every comment exactly once in pre-order, post excluded
    pub fn flatten(&self) -> Vec<&CommentNode> {
        self.preorder()
            .into_iter()
            .skip(1)
            .map(|id| &self.nodes[id])
            .collect()
    }

    /// Comment leaves in pre-order; each one terminates a branch
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .skip(1)
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Ids from the post down to `id`, both inclusive
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.nodes.get(id).map(|_| id);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.nodes[current].parent;
        }
        path.reverse();
        path
    }

    /// Deepest comment depth (0 when there are no comments)
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Distinct comment authors in first-seen pre-order
    pub fn authors(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.flatten()
            .into_iter()
            .filter_map(|n| n.author.as_deref())
            .filter(|a| seen.insert(*a))
            .collect()
    }

    /// Comment bodies in pre-order, aligned with `flatten()`
    pub fn comment_texts(&self) -> Vec<String> {
        self.flatten().into_iter().map(|n| n.body.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommentTree {
        // post
        // ├── a
        // │   ├── b
        // │   └── c
        // └── d
        let mut tree = CommentTree::with_root(None, "post".into(), 10);
        let a = tree.attach(ROOT, "u1".into(), "a".into(), 1);
        tree.attach(a, "u2".into(), "b".into(), -2);
        tree.attach(a, "u1".into(), "c".into(), 0);
        tree.attach(ROOT, "u3".into(), "d".into(), 5);
        tree
    }

    #[test]
    fn test_flatten_preorder() {
        let tree = sample();
        let bodies: Vec<&str> = tree.flatten().iter().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, vec!["a", "b", "c", "d"]);
        assert_eq!(tree.comment_count(), 4);
    }

    #[test]
    fn test_flatten_is_restartable() {
        let tree = sample();
        assert_eq!(tree.flatten(), tree.flatten());
    }

    #[test]
    fn test_leaves_and_paths() {
        let tree = sample();
        assert_eq!(tree.leaves(), vec![2, 3, 4]);
        assert_eq!(tree.path_to(3), vec![0, 1, 3]);
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn test_authors_first_seen() {
        let tree = sample();
        assert_eq!(tree.authors(), vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_post_only_has_no_leaves() {
        let tree = CommentTree::with_root(Some("op".into()), "hello".into(), 0);
        assert!(tree.leaves().is_empty());
        assert!(tree.flatten().is_empty());
        assert!(tree.root().is_leaf());
    }
}
