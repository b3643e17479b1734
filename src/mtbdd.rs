//! The MTBDD manager: node store accessors, variables, the ITE engine and the
//! boolean connectives derived from it.
//!
//! All engine state sits behind one [`RwLock`]. Every accessor in this module
//! holds the lock for exactly one read-modify-write step; the recursive
//! algorithms re-enter through these accessors instead of holding the lock
//! across recursion. Two concurrent derivations of the same node race
//! harmlessly: hash-consing makes them agree on the handle.

use std::fmt::Debug;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::Caches;
use crate::config::MtbddConfig;
use crate::error::{NodeError, VariableError};
use crate::node::{DecisionNode, Node};
use crate::reference::Ref;
use crate::registry::VarRegistry;
use crate::table::NodeTable;
use crate::types::Level;
use crate::value::Value;

/// Everything guarded by the engine lock.
pub(crate) struct State {
    pub table: NodeTable,
    pub registry: VarRegistry,
    pub caches: Caches,
}

impl State {
    pub fn new(config: &MtbddConfig) -> Self {
        Self {
            table: NodeTable::new(),
            registry: VarRegistry::new(),
            caches: Caches::new(config.cache_capacity_bits),
        }
    }
}

/// Shannon split of several operands on their topmost variable.
pub(crate) struct Split<const N: usize> {
    pub variable: Arc<str>,
    pub level: Level,
    /// `(low, high)` cofactor of each operand.
    pub cofactors: [(Ref, Ref); N],
}

pub struct Mtbdd {
    state: RwLock<State>,
    config: MtbddConfig,
}

impl Mtbdd {
    pub fn new() -> Self {
        Self::with_config(MtbddConfig::default())
    }

    pub fn with_config(config: MtbddConfig) -> Self {
        Self {
            state: RwLock::new(State::new(&config)),
            config,
        }
    }
}

impl Default for Mtbdd {
    fn default() -> Self {
        Mtbdd::new()
    }
}

impl Debug for Mtbdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Mtbdd")
            .field("nodes", &state.table.len())
            .field("next_handle", &state.table.next_handle())
            .field("variables", &state.registry.len())
            .finish()
    }
}

// ==================================================================
// Lock access and node store
// ==================================================================

impl Mtbdd {
    pub fn config(&self) -> &MtbddConfig {
        &self.config
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write()
    }

    /// Look up a handle in the node store.
    pub fn lookup(&self, node: Ref) -> Result<Node, NodeError> {
        self.read().table.get(node).cloned().ok_or(NodeError::NotFound(node))
    }

    /// Whether `node` is a live handle.
    pub fn contains(&self, node: Ref) -> bool {
        self.read().table.contains(node)
    }

    /// Terminal value of `node`, or `None` for a decision node.
    ///
    /// A dangling handle reads as the `false` terminal.
    pub fn terminal_value(&self, node: Ref) -> Option<Value> {
        match self.read().table.get(node) {
            Some(Node::Terminal(value)) => Some(value.clone()),
            Some(Node::Decision(_)) => None,
            None => {
                debug!("dangling handle {} read as false", node);
                Some(Value::Bool(false))
            }
        }
    }

    /// Decision node behind `node`, or `None` for terminals and dangling handles.
    pub fn decision(&self, node: Ref) -> Option<DecisionNode> {
        match self.read().table.get(node) {
            Some(Node::Decision(d)) => Some(d.clone()),
            _ => None,
        }
    }

    pub fn is_terminal(&self, node: Ref) -> bool {
        self.terminal_value(node).is_some()
    }

    /// Level of the variable tested by `node`; `None` for terminals.
    pub fn level_of(&self, node: Ref) -> Option<Level> {
        self.read().table.get(node).and_then(Node::level)
    }

    pub fn low(&self, node: Ref) -> Option<Ref> {
        self.decision(node).map(|d| d.low)
    }

    pub fn high(&self, node: Ref) -> Option<Ref> {
        self.decision(node).map(|d| d.high)
    }

    /// Find or create the terminal holding `value`.
    pub fn terminal(&self, value: Value) -> Ref {
        self.write().table.terminal(value)
    }

    /// Terminal for anything convertible into a [`Value`].
    pub fn constant(&self, value: impl Into<Value>) -> Ref {
        self.terminal(value.into())
    }

    pub fn zero(&self) -> Ref {
        Ref::FALSE
    }

    pub fn one(&self) -> Ref {
        Ref::TRUE
    }

    /// Raw node construction: the caller guarantees that `low` and `high`
    /// only test variables below `level`.
    pub(crate) fn mk(&self, variable: &Arc<str>, level: Level, low: Ref, high: Ref) -> Ref {
        if low == high {
            debug!("mk: duplicates {} == {}", low, high);
            return low;
        }
        self.write().table.decision(variable, level, low, high)
    }

    /// Decision node `variable ? high : low`.
    ///
    /// If a child tests a variable at or above `variable`, the node is built
    /// through [`ite`][Mtbdd::ite] instead so the ordering stays intact.
    pub fn mk_node(&self, variable: &str, low: Ref, high: Ref) -> Result<Ref, VariableError> {
        debug!("mk_node(variable = {}, low = {}, high = {})", variable, low, high);
        let (name, level) = self.read().registry.resolve(variable)?;
        let ordered = [low, high]
            .iter()
            .all(|&child| self.level_of(child).map_or(true, |l| l > level));
        if ordered {
            Ok(self.mk(&name, level, low, high))
        } else {
            debug!("mk_node: children above {}, going through ite", level);
            let x = self.mk(&name, level, Ref::FALSE, Ref::TRUE);
            Ok(self.ite(x, high, low))
        }
    }

    /// Cofactors of every operand with respect to the topmost variable among
    /// them, under a single read lock. `None` if all operands are terminals.
    pub(crate) fn split<const N: usize>(&self, operands: [Ref; N]) -> Option<Split<N>> {
        let state = self.read();
        let mut top: Option<&DecisionNode> = None;
        for &r in &operands {
            if let Some(Node::Decision(d)) = state.table.get(r) {
                if top.map_or(true, |t| d.level < t.level) {
                    top = Some(d);
                }
            }
        }
        let top = top?;
        let level = top.level;
        let cofactors = operands.map(|r| match state.table.get(r) {
            Some(Node::Decision(d)) if d.level == level => (d.low, d.high),
            _ => (r, r),
        });
        Some(Split {
            variable: Arc::clone(&top.variable),
            level,
            cofactors,
        })
    }

    /// Low and high cofactor of `node` with respect to the variable at `level`.
    pub fn top_cofactors(&self, node: Ref, level: Level) -> (Ref, Ref) {
        match self.decision(node) {
            Some(d) if d.level == level => (d.low, d.high),
            Some(d) if d.level < level => {
                let name = self.read().registry.name(level).cloned();
                match name {
                    Some(name) => (self.restrict(node, &name, false), self.restrict(node, &name, true)),
                    None => (node, node),
                }
            }
            _ => (node, node),
        }
    }
}

// ==================================================================
// Variables
// ==================================================================

impl Mtbdd {
    /// Declare variables in order, assigning each new name the next level.
    ///
    /// Invalid names are skipped; already declared names keep their level.
    pub fn declare<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.write();
        for name in names {
            let name = name.as_ref();
            if let Err(e) = state.registry.declare(name) {
                warn!("declare: skipping `{}`: {}", name, e);
            }
        }
    }

    /// Declare a single variable, reporting invalid names.
    pub fn try_declare(&self, name: &str) -> Result<Level, VariableError> {
        self.write().registry.declare(name)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.read().registry.contains(name)
    }

    pub fn level(&self, name: &str) -> Option<Level> {
        self.read().registry.level(name)
    }

    /// Declared variable names in level order.
    pub fn variables(&self) -> Vec<String> {
        self.read().registry.names().iter().map(|n| n.to_string()).collect()
    }

    pub fn num_vars(&self) -> usize {
        self.read().registry.len()
    }

    /// The projection function of a declared variable.
    pub fn var(&self, name: &str) -> Result<Ref, VariableError> {
        let (name, level) = self.read().registry.resolve(name)?;
        Ok(self.mk(&name, level, Ref::FALSE, Ref::TRUE))
    }
}

// ==================================================================
// ITE engine and boolean connectives
// ==================================================================

impl Mtbdd {
    /// If-then-else: `f ? g : h`, with `f` read through truthiness.
    ///
    /// ```text
    /// ITE(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use mtbdd_rs::mtbdd::Mtbdd;
    ///
    /// let mtbdd = Mtbdd::new();
    /// mtbdd.declare(["x"]);
    /// let x = mtbdd.var("x").unwrap();
    /// let f = mtbdd.ite(x, mtbdd.constant(10), mtbdd.constant(20));
    /// assert_eq!(mtbdd.low(f), Some(mtbdd.constant(20)));
    /// assert_eq!(mtbdd.high(f), Some(mtbdd.constant(10)));
    /// ```
    pub fn ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        debug!("ite(f = {}, g = {}, h = {})", f, g, h);

        if let Some(value) = self.terminal_value(f) {
            debug!("ite: condition {} is {}", f, value);
            return if value.is_truthy() { g } else { h };
        }
        if g == h {
            debug!("ite(F,G,G) => G");
            return g;
        }

        let key = (f, g, h);
        let cached = {
            let state = self.read();
            state.caches.ite.get(&key).filter(|&res| state.table.contains(res))
        };
        if let Some(res) = cached {
            debug!("cache: ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
            return res;
        }

        let Some(split) = self.split([f, g, h]) else {
            return h;
        };
        let [(f0, f1), (g0, g1), (h0, h1)] = split.cofactors;
        debug!("top variable = {} at {}", split.variable, split.level);

        let e = self.ite(f0, g0, h0);
        let t = self.ite(f1, g1, h1);
        debug!("cofactors of res: e = {}, t = {}", e, t);

        let res = self.mk(&split.variable, split.level, e, t);
        debug!("computed: ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
        self.write().caches.ite.insert(key, res);
        res
    }

    pub fn not(&self, f: Ref) -> Ref {
        debug!("not(f = {})", f);
        self.ite(f, Ref::FALSE, Ref::TRUE)
    }

    pub fn and(&self, f: Ref, g: Ref) -> Ref {
        debug!("and(f = {}, g = {})", f, g);
        self.ite(f, g, Ref::FALSE)
    }

    pub fn or(&self, f: Ref, g: Ref) -> Ref {
        debug!("or(f = {}, g = {})", f, g);
        self.ite(f, Ref::TRUE, g)
    }

    pub fn xor(&self, f: Ref, g: Ref) -> Ref {
        debug!("xor(f = {}, g = {})", f, g);
        let not_g = self.not(g);
        self.ite(f, not_g, g)
    }

    pub fn implies(&self, f: Ref, g: Ref) -> Ref {
        debug!("implies(f = {}, g = {})", f, g);
        self.ite(f, g, Ref::TRUE)
    }

    pub fn equiv(&self, f: Ref, g: Ref) -> Ref {
        debug!("equiv(f = {}, g = {})", f, g);
        let not_g = self.not(g);
        self.ite(f, g, not_g)
    }

    pub fn and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = Ref::TRUE;
        for node in nodes {
            res = self.and(res, node);
            if res == Ref::FALSE {
                break;
            }
        }
        res
    }

    pub fn or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = Ref::FALSE;
        for node in nodes {
            res = self.or(res, node);
            if res == Ref::TRUE {
                break;
            }
        }
        res
    }
}
