//! Evaluation and satisfiability: `evaluate`, `sat`, `all_sat`, `count_sat`,
//! `support`.
//!
//! A terminal "satisfies" when its value is truthy. Everything here is a pure
//! read of the node store and runs under one shared lock.

use std::sync::Arc;

use log::debug;
use num_bigint::BigUint;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::mtbdd::{Mtbdd, State};
use crate::node::Node;
use crate::reference::Ref;
use crate::types::{Assignment, Level};
use crate::value::Value;

impl Mtbdd {
    /// Value of `f` under `assignment`; variables missing from the
    /// assignment read as `false`.
    pub fn evaluate(&self, f: Ref, assignment: &Assignment) -> Value {
        let state = self.read();
        let mut current = f;
        loop {
            match state.table.get(current) {
                Some(Node::Terminal(value)) => return value.clone(),
                Some(Node::Decision(d)) => {
                    let bit = assignment.get(&*d.variable).copied().unwrap_or(false);
                    current = if bit { d.high } else { d.low };
                }
                None => {
                    debug!("evaluate: dangling handle {}", current);
                    return Value::Bool(false);
                }
            }
        }
    }

    /// Variables `f` depends on, with their levels, in level order.
    pub(crate) fn support_vars(&self, f: Ref) -> Vec<(Arc<str>, Level)> {
        let state = self.read();
        let mut seen = FxHashSet::default();
        let mut vars: FxHashMap<Level, Arc<str>> = FxHashMap::default();
        let mut stack = vec![f];
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            if let Some(Node::Decision(d)) = state.table.get(node) {
                vars.entry(d.level).or_insert_with(|| Arc::clone(&d.variable));
                stack.push(d.low);
                stack.push(d.high);
            }
        }
        let mut vars: Vec<(Arc<str>, Level)> = vars.into_iter().map(|(level, name)| (name, level)).collect();
        vars.sort_by_key(|&(_, level)| level);
        vars
    }

    pub(crate) fn support_names(&self, f: Ref) -> FxHashSet<Arc<str>> {
        self.support_vars(f).into_iter().map(|(name, _)| name).collect()
    }

    /// Variables `f` depends on, in level order.
    pub fn support(&self, f: Ref) -> Vec<String> {
        self.support_vars(f).into_iter().map(|(name, _)| name.to_string()).collect()
    }

    /// One assignment reaching a truthy terminal, found by depth-first search
    /// trying `true` before `false`. Only variables on the path are assigned.
    pub fn sat(&self, f: Ref) -> Option<Assignment> {
        debug!("sat(f = {})", f);
        let state = self.read();
        let mut path = Assignment::new();
        let mut dead = FxHashSet::default();
        if sat_(&state, f, &mut path, &mut dead) {
            Some(path)
        } else {
            None
        }
    }

    /// Every assignment over the support of `f` reaching a truthy terminal.
    ///
    /// Assignments come out in lexicographic order over the support in level
    /// order, `false` first.
    pub fn all_sat(&self, f: Ref) -> Vec<Assignment> {
        debug!("all_sat(f = {})", f);
        let support = self.support_vars(f);
        let state = self.read();
        let mut res = Vec::new();
        let mut path = Assignment::new();
        all_sat_(&state, f, &support, 0, &mut path, &mut res);
        res
    }

    /// Number of assignments over the support of `f` reaching a truthy
    /// terminal.
    pub fn count_sat(&self, f: Ref) -> BigUint {
        debug!("count_sat(f = {})", f);
        let support = self.support_vars(f);
        let position: FxHashMap<Level, usize> = support.iter().enumerate().map(|(i, &(_, level))| (level, i)).collect();
        let state = self.read();
        let mut memo = FxHashMap::default();
        let n = support.len();
        let root_pos = position_of(&state, f, &position, n);
        count_(&state, f, &position, n, &mut memo) << root_pos
    }
}

fn sat_(state: &State, f: Ref, path: &mut Assignment, dead: &mut FxHashSet<Ref>) -> bool {
    if dead.contains(&f) {
        return false;
    }
    match state.table.get(f) {
        Some(Node::Terminal(value)) => value.is_truthy(),
        Some(Node::Decision(d)) => {
            for (bit, child) in [(true, d.high), (false, d.low)] {
                path.insert(d.variable.to_string(), bit);
                if sat_(state, child, path, dead) {
                    return true;
                }
                path.remove(&*d.variable);
            }
            dead.insert(f);
            false
        }
        None => false,
    }
}

fn all_sat_(
    state: &State,
    f: Ref,
    support: &[(Arc<str>, Level)],
    i: usize,
    path: &mut Assignment,
    res: &mut Vec<Assignment>,
) {
    let Some((name, level)) = support.get(i) else {
        if let Some(Node::Terminal(value)) = state.table.get(f) {
            if value.is_truthy() {
                res.push(path.clone());
            }
        }
        return;
    };
    let (low, high) = match state.table.get(f) {
        Some(Node::Decision(d)) if d.level == *level => (d.low, d.high),
        _ => (f, f),
    };
    for (bit, child) in [(false, low), (true, high)] {
        path.insert(name.to_string(), bit);
        all_sat_(state, child, support, i + 1, path, res);
    }
    path.remove(&**name);
}

/// Index of the variable tested by `f` within the support; `n` for terminals.
fn position_of(state: &State, f: Ref, position: &FxHashMap<Level, usize>, n: usize) -> usize {
    state
        .table
        .get(f)
        .and_then(Node::level)
        .and_then(|level| position.get(&level).copied())
        .unwrap_or(n)
}

/// Satisfying assignments of the support variables from `f`'s position down.
fn count_(
    state: &State,
    f: Ref,
    position: &FxHashMap<Level, usize>,
    n: usize,
    memo: &mut FxHashMap<Ref, BigUint>,
) -> BigUint {
    let (low, high) = match state.table.get(f) {
        Some(Node::Terminal(value)) => {
            return if value.is_truthy() { BigUint::from(1u32) } else { BigUint::ZERO };
        }
        Some(Node::Decision(d)) => (d.low, d.high),
        None => return BigUint::ZERO,
    };
    if let Some(count) = memo.get(&f) {
        return count.clone();
    }
    let here = position_of(state, f, position, n);
    let count_low = count_(state, low, position, n, memo) << (position_of(state, low, position, n) - here - 1);
    let count_high = count_(state, high, position, n, memo) << (position_of(state, high, position, n) - here - 1);
    let count = count_low + count_high;
    memo.insert(f, count.clone());
    count
}
