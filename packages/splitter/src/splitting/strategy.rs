//! Cut strategies for outline splitting.

use super::types::SplitContext;
use crate::types::NavNode;

/// What the traversal does with a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutDecision {
    /// Produce one chapter from this node and its whole subtree.
    Cut,

    /// Produce nothing for this node; visit its children one level deeper.
    Descend,
}

/// Trait for configurable cut strategies.
///
/// Implementations decide, per node and depth, whether the node becomes a
/// chapter or the traversal continues below it.
pub trait CutStrategy {
    /// Decide what to do with `node` found at `depth` (top level is 1).
    fn decide(&self, node: &NavNode, depth: usize, context: &SplitContext) -> CutDecision;
}

/// Strategy that cuts at the target depth, or earlier at childless nodes.
///
/// A leaf above the target depth becomes a chapter on its own.
pub struct DepthCutStrategy;

impl CutStrategy for DepthCutStrategy {
    fn decide(&self, node: &NavNode, depth: usize, context: &SplitContext) -> CutDecision {
        match node {
            NavNode::Leaf { .. } => CutDecision::Cut,
            NavNode::Branch { .. } if depth >= context.target_depth => CutDecision::Cut,
            NavNode::Branch { .. } => CutDecision::Descend,
        }
    }
}
