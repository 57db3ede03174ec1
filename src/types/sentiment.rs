//! Sentiment threaded down reply branches

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Propagated sentiment at one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSentiment {
    pub node: NodeId,
    pub parent: Option<NodeId>,
    pub depth: usize,
    /// Provider score for the node's own body
    pub raw: f64,
    /// Parent's effective sentiment (the post inherits its own raw score)
    pub inherited: f64,
    /// `inherited` if the node is neutral, else `raw`
    pub effective: f64,
    /// Depth of the first sign flip on the path to this node, if any
    pub first_defection: Option<usize>,
}

impl NodeSentiment {
    /// Sign flip against the parent at this very node
    pub fn flips(&self) -> bool {
        self.effective * self.inherited < 0.0
    }
}

/// One step of a root-to-leaf branch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchStep {
    pub node: NodeId,
    pub depth: usize,
    pub inherited: f64,
    pub raw: f64,
    pub effective: f64,
}

/// Root-to-leaf path with its sentiments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub leaf: NodeId,
    /// Post first, leaf last
    pub steps: Vec<BranchStep>,
    /// Depth of the first flip on this branch
    pub first_defection: Option<usize>,
}

impl Branch {
    /// Nodes on the path including the post
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// A branch always holds the post and one comment
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Result of one propagation pass over a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentTrace {
    pub neutral_threshold: f64,
    /// Indexed by `NodeId`
    pub nodes: Vec<NodeSentiment>,
    /// Pre-order visit order
    pub order: Vec<NodeId>,
    /// Comment leaves in pre-order
    pub leaves: Vec<NodeId>,
}

impl SentimentTrace {
    /// Sentiment record for a node
    pub fn get(&self, id: NodeId) -> Option<&NodeSentiment> {
        self.nodes.get(id)
    }

    /// Number of root-to-leaf branches
    pub fn branch_count(&self) -> usize {
        self.leaves.len()
    }

    /// Enumerate every branch, leaves in pre-order
    pub fn branches(&self) -> Vec<Branch> {
        self.leaves.iter().map(|&leaf| self.branch_to(leaf)).collect()
    }

    /// Branch ending at `leaf`
    pub fn branch_to(&self, leaf: NodeId) -> Branch {
        let mut steps = Vec::new();
        let mut cursor = self.nodes.get(leaf).map(|_| leaf);
        while let Some(id) = cursor {
            let n = &self.nodes[id];
            steps.push(BranchStep {
                node: id,
                depth: n.depth,
                inherited: n.inherited,
                raw: n.raw,
                effective: n.effective,
            });
            cursor = n.parent;
        }
        steps.reverse();

        Branch {
            leaf,
            steps,
            first_defection: self.nodes.get(leaf).and_then(|n| n.first_defection),
        }
    }
}
