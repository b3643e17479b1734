//! Node arena and canonical (unique) table.
//!
//! Every node lives in a plain arena indexed by its [`Ref`]. Two hash maps
//! provide hash-consing:
//!
//! ```text
//! unique:    (level, variable, low, high) -> Ref   for decision nodes
//! terminals: Value                        -> Ref   for terminals
//! ```
//!
//! For declared variables the name is determined by the level. It is part of
//! the key because `rename` may label nodes with an undeclared name at an
//! existing level, and those nodes must stay distinct.
//!
//! [`NodeTable::terminal`] and [`NodeTable::decision`] are the only places
//! where handles are minted. Handles come from a monotonically increasing
//! counter (the arena length) and are never reused: garbage collection empties
//! slots but never hands them out again.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::{DecisionNode, Node};
use crate::reference::Ref;
use crate::types::Level;
use crate::value::Value;

/// Canonical-table key of a decision node.
pub type UniqueKey = (Level, Arc<str>, Ref, Ref);

fn key_of(d: &DecisionNode) -> UniqueKey {
    (d.level, Arc::clone(&d.variable), d.low, d.high)
}

pub struct NodeTable {
    /// Arena, indexed by `Ref::index()`. Slot 0 is the `NULL` sentinel.
    nodes: Vec<Option<Node>>,

    /// Canonical table for decision nodes.
    unique: FxHashMap<UniqueKey, Ref>,
    /// Canonical table for terminals.
    terminals: FxHashMap<Value, Ref>,

    /// Number of occupied slots.
    live: usize,
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTable {
    /// Create a new table holding only the two boolean terminals.
    pub fn new() -> Self {
        let mut table = Self {
            nodes: vec![None],
            unique: FxHashMap::default(),
            terminals: FxHashMap::default(),
            live: 0,
        };
        let f = table.terminal(Value::Bool(false));
        let t = table.terminal(Value::Bool(true));
        assert_eq!(f, Ref::FALSE);
        assert_eq!(t, Ref::TRUE);
        table
    }

    /// Handle that the next allocation will receive.
    pub fn next_handle(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Number of live nodes (decision nodes and terminals).
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of live terminals.
    pub fn num_terminals(&self) -> usize {
        self.terminals.len()
    }

    /// Number of live decision nodes.
    pub fn num_decisions(&self) -> usize {
        self.unique.len()
    }

    pub fn get(&self, node: Ref) -> Option<&Node> {
        self.nodes.get(node.index()).and_then(|slot| slot.as_ref())
    }

    pub fn contains(&self, node: Ref) -> bool {
        self.get(node).is_some()
    }

    /// Iterate over all live `(handle, node)` pairs in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (Ref, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (Ref::new(i as u32), node)))
    }

    /// Iterate over all canonical-table entries.
    pub fn unique_entries(&self) -> impl Iterator<Item = (&UniqueKey, Ref)> + '_ {
        self.unique.iter().map(|(key, &node)| (key, node))
    }

    fn alloc(&mut self, node: Node) -> Ref {
        let index = self.nodes.len();
        assert!(index < u32::MAX as usize, "Node table is full");
        self.nodes.push(Some(node));
        self.live += 1;
        Ref::new(index as u32)
    }

    /// Find or create the terminal holding `value`.
    pub fn terminal(&mut self, value: Value) -> Ref {
        if let Some(&existing) = self.terminals.get(&value) {
            return existing;
        }
        let node = self.alloc(Node::Terminal(value.clone()));
        self.terminals.insert(value, node);
        node
    }

    /// Find or create the decision node `(level, variable, low, high)`.
    ///
    /// A redundant test (`low == high`) is reduced to the shared child without
    /// touching the table.
    pub fn decision(&mut self, variable: &Arc<str>, level: Level, low: Ref, high: Ref) -> Ref {
        if low == high {
            return low;
        }
        let key = (level, Arc::clone(variable), low, high);
        if let Some(&existing) = self.unique.get(&key) {
            return existing;
        }
        let node = self.alloc(Node::Decision(DecisionNode {
            variable: Arc::clone(variable),
            level,
            low,
            high,
        }));
        self.unique.insert(key, node);
        node
    }

    /// All live decision nodes at `level`.
    pub fn nodes_at(&self, level: Level) -> Vec<Ref> {
        self.iter()
            .filter(|(_, node)| node.level() == Some(level))
            .map(|(r, _)| r)
            .collect()
    }

    /// Remove the canonical-table entry of a decision node, keeping the node
    /// itself. Used while a level swap rewrites nodes in place.
    pub(crate) fn unlink(&mut self, node: Ref) {
        let key = match self.get(node) {
            Some(Node::Decision(d)) => key_of(d),
            _ => return,
        };
        if self.unique.get(&key) == Some(&node) {
            self.unique.remove(&key);
        }
    }

    /// Overwrite a decision node in place and register it under its new key.
    ///
    /// The caller guarantees that the new node denotes the same function as
    /// the old one and that the new key is not taken.
    pub(crate) fn rewrite(&mut self, node: Ref, decision: DecisionNode) {
        let key = key_of(&decision);
        debug_assert!(!self.unique.contains_key(&key), "key of {} already taken", node);
        self.unique.insert(key, node);
        self.nodes[node.index()] = Some(Node::Decision(decision));
    }

    /// Drop every node not in `alive`; the boolean terminals always survive.
    ///
    /// Returns the number of removed nodes.
    pub fn retain(&mut self, alive: &FxHashSet<Ref>) -> usize {
        let mut removed = 0;
        for (i, slot) in self.nodes.iter_mut().enumerate() {
            let node = Ref::new(i as u32);
            if slot.is_some() && node != Ref::FALSE && node != Ref::TRUE && !alive.contains(&node) {
                *slot = None;
                removed += 1;
            }
        }
        self.live -= removed;
        self.rebuild_index();
        removed
    }

    /// Rebuild both canonical maps from the arena.
    fn rebuild_index(&mut self) {
        self.unique.clear();
        self.terminals.clear();
        for (i, slot) in self.nodes.iter().enumerate() {
            let node = Ref::new(i as u32);
            match slot {
                Some(Node::Decision(d)) => {
                    self.unique.insert(key_of(d), node);
                }
                Some(Node::Terminal(value)) => {
                    self.terminals.insert(value.clone(), node);
                }
                None => {}
            }
        }
    }

    /// Reassemble a table from raw slots (snapshot loading).
    ///
    /// Slots beyond the given entries up to `next_handle` stay empty, so that
    /// handle numbering continues where the snapshot left off.
    pub(crate) fn from_entries(entries: Vec<(Ref, Node)>, next_handle: u32) -> Self {
        let mut nodes: Vec<Option<Node>> = Vec::new();
        nodes.resize_with(next_handle as usize, || None);
        let mut live = 0;
        for (r, node) in entries {
            if r.index() >= nodes.len() {
                nodes.resize_with(r.index() + 1, || None);
            }
            if nodes[r.index()].replace(node).is_none() {
                live += 1;
            }
        }
        if nodes.is_empty() {
            nodes.push(None);
        }
        let mut table = Self {
            nodes,
            unique: FxHashMap::default(),
            terminals: FxHashMap::default(),
            live,
        };
        table.rebuild_index();
        table
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn var(name: &str) -> Arc<str> {
        Arc::from(name)
    }

    #[test]
    fn test_boolean_terminals_reserved() {
        let table = NodeTable::new();
        assert_eq!(table.get(Ref::FALSE), Some(&Node::Terminal(Value::Bool(false))));
        assert_eq!(table.get(Ref::TRUE), Some(&Node::Terminal(Value::Bool(true))));
        assert_eq!(table.get(Ref::NULL), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.next_handle(), 3);
    }

    #[test]
    fn test_terminal_dedup() {
        let mut table = NodeTable::new();
        let a = table.terminal(Value::Int(5));
        let b = table.terminal(Value::Int(5));
        let c = table.terminal(Value::Float(5.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.terminal(Value::Bool(true)), Ref::TRUE);
    }

    #[test]
    fn test_decision_dedup() {
        let mut table = NodeTable::new();
        let x = var("x");
        let a = table.decision(&x, Level::new(0), Ref::FALSE, Ref::TRUE);
        let b = table.decision(&x, Level::new(0), Ref::FALSE, Ref::TRUE);
        assert_eq!(a, b);
        assert_eq!(table.num_decisions(), 1);
    }

    #[test]
    fn test_decision_reduction() {
        let mut table = NodeTable::new();
        let x = var("x");
        let before = table.len();
        let r = table.decision(&x, Level::new(0), Ref::TRUE, Ref::TRUE);
        assert_eq!(r, Ref::TRUE);
        assert_eq!(table.len(), before);
    }

    #[test]
    fn test_same_level_different_names_are_distinct() {
        let mut table = NodeTable::new();
        let a = table.decision(&var("x"), Level::new(0), Ref::FALSE, Ref::TRUE);
        let b = table.decision(&var("ghost"), Level::new(0), Ref::FALSE, Ref::TRUE);
        assert_ne!(a, b);
        assert_eq!(table.decision(&var("ghost"), Level::new(0), Ref::FALSE, Ref::TRUE), b);
        assert_eq!(table.num_decisions(), 2);
    }

    #[test]
    fn test_retain_never_reuses_handles() {
        let mut table = NodeTable::new();
        let x = var("x");
        let a = table.decision(&x, Level::new(0), Ref::FALSE, Ref::TRUE);
        let removed = table.retain(&FxHashSet::default());
        assert_eq!(removed, 1);
        assert!(!table.contains(a));
        assert_eq!(table.num_decisions(), 0);

        let b = table.decision(&x, Level::new(0), Ref::FALSE, Ref::TRUE);
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_from_entries() {
        let mut table = NodeTable::new();
        let x = var("x");
        let five = table.terminal(Value::Int(5));
        let a = table.decision(&x, Level::new(0), Ref::FALSE, five);
        let entries: Vec<(Ref, Node)> = table.iter().map(|(r, n)| (r, n.clone())).collect();

        let restored = NodeTable::from_entries(entries, table.next_handle());
        assert_eq!(restored.len(), table.len());
        assert_eq!(restored.next_handle(), table.next_handle());
        assert_eq!(restored.get(a), table.get(a));

        let mut restored = restored;
        assert_eq!(restored.decision(&x, Level::new(0), Ref::FALSE, five), a);
        assert_eq!(restored.terminal(Value::Int(5)), five);
    }
}
