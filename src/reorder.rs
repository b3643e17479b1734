//! Explicit variable reordering.
//!
//! A total reorder is carried out as a sequence of adjacent level swaps,
//! each of which rewrites the affected nodes in place. Handles keep denoting
//! the same functions across a reorder, so diagrams held by callers stay
//! valid.
//!
//! # Adjacent swap
//!
//! Let `x` sit at level `i` and `y` at level `i + 1`. Every `y`-node is
//! relabelled to level `i` unchanged. An `x`-node whose children do not test
//! `y` moves to level `i + 1` unchanged. Every other `x`-node
//!
//! ```text
//!       x                      y
//!     /   \                  /   \
//!    y     y       ==>      x     x
//!   / \   / \              / \   / \
//! f00 f01 f10 f11        f00 f10 f01 f11
//! ```
//!
//! is rewritten in place to test `y`, with fresh (or shared) `x`-nodes below.

use std::sync::Arc;

use log::{debug, info};

use crate::error::VariableError;
use crate::mtbdd::{Mtbdd, State};
use crate::node::DecisionNode;
use crate::reference::Ref;
use crate::table::NodeTable;
use crate::types::Level;

impl Mtbdd {
    /// Swap the variables at `level` and `level + 1`.
    ///
    /// Returns `false` (and does nothing) if there is no level below.
    pub fn swap_adjacent(&self, level: Level) -> bool {
        let mut state = self.write();
        if level.index() + 1 >= state.registry.len() {
            return false;
        }
        swap_levels(&mut state, level);
        state.caches.clear();
        true
    }

    /// Reorder the variables to `new_order`, which must be a permutation of
    /// exactly the declared variables.
    ///
    /// On error nothing is changed.
    pub fn set_order<S: AsRef<str>>(&self, new_order: &[S]) -> Result<(), VariableError> {
        let mut state = self.write();
        state.registry.check_permutation(new_order)?;

        let mut swaps = 0;
        for (target, name) in new_order.iter().enumerate() {
            let (_, mut level) = state.registry.resolve(name.as_ref())?;
            while level.index() > target {
                let Some(above) = level.prev() else {
                    break;
                };
                swap_levels(&mut state, above);
                swaps += 1;
                level = above;
            }
        }
        state.caches.clear();
        info!("reordered {} variables with {} swaps", new_order.len(), swaps);
        Ok(())
    }
}

fn swap_levels(state: &mut State, level: Level) {
    let lower = level.next();
    let (Some(x), Some(y)) = (state.registry.name(level).cloned(), state.registry.name(lower).cloned()) else {
        return;
    };
    debug!("swapping {} ({}) with {} ({})", x, level, y, lower);

    let table = &mut state.table;
    let xs = table.nodes_at(level);
    let ys = table.nodes_at(lower);

    // Cofactors of a child with respect to y, and the name it is tested under.
    let split = |table: &NodeTable, r: Ref| match table.get(r).and_then(|n| n.as_decision()) {
        Some(d) if d.level == lower => (d.low, d.high, Some(Arc::clone(&d.variable))),
        _ => (r, r, None),
    };

    let mut independent = Vec::new();
    let mut dependent = Vec::new();
    for &r in &xs {
        let Some(d) = table.get(r).and_then(|n| n.as_decision()).cloned() else {
            continue;
        };
        let (f00, f01, low_var) = split(table, d.low);
        let (f10, f11, high_var) = split(table, d.high);
        match low_var.or(high_var) {
            None => independent.push((r, d)),
            Some(top) => dependent.push((r, d.variable, top, [f00, f01, f10, f11])),
        }
    }

    for &r in xs.iter().chain(&ys) {
        table.unlink(r);
    }

    for &r in &ys {
        if let Some(d) = table.get(r).and_then(|n| n.as_decision()).cloned() {
            table.rewrite(r, DecisionNode { level, ..d });
        }
    }
    for (r, d) in independent {
        table.rewrite(r, DecisionNode { level: lower, ..d });
    }
    for (r, bottom, top, [f00, f01, f10, f11]) in dependent {
        let low = table.decision(&bottom, lower, f00, f10);
        let high = table.decision(&bottom, lower, f01, f11);
        table.rewrite(
            r,
            DecisionNode {
                variable: top,
                level,
                low,
                high,
            },
        );
    }

    state.registry.swap(level);
}
