use std::sync::Arc;

use crate::reference::Ref;
use crate::types::Level;
use crate::value::Value;

/// Internal decision node: `variable ? high : low`.
///
/// # Invariants
///
/// - `low != high` (redundant tests are reduced away by the manager)
/// - `level` is strictly smaller than the level of any decision node
///   reachable through `low` or `high`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionNode {
    pub variable: Arc<str>,
    pub level: Level,
    pub low: Ref,
    pub high: Ref,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Decision(DecisionNode),
    Terminal(Value),
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal(_))
    }

    pub fn as_decision(&self) -> Option<&DecisionNode> {
        match self {
            Node::Decision(node) => Some(node),
            Node::Terminal(_) => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&Value> {
        match self {
            Node::Decision(_) => None,
            Node::Terminal(value) => Some(value),
        }
    }

    /// Level of a decision node; terminals sit below every level.
    pub fn level(&self) -> Option<Level> {
        self.as_decision().map(|node| node.level)
    }

    /// Children of a decision node, `None` for terminals.
    pub fn children(&self) -> Option<(Ref, Ref)> {
        self.as_decision().map(|node| (node.low, node.high))
    }
}
