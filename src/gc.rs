//! Mark-sweep garbage collection and usage statistics.

use std::fmt;

use log::info;
use rustc_hash::FxHashSet;

use crate::cache::CacheStats;
use crate::mtbdd::Mtbdd;
use crate::node::Node;
use crate::reference::Ref;
use crate::table::NodeTable;

/// Snapshot of the engine's memory usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub decision_nodes: usize,
    pub terminals: usize,
    pub next_handle: u32,
    pub variables: usize,
    pub caches: Vec<(&'static str, CacheStats)>,
}

impl Stats {
    /// Live nodes of both kinds.
    pub fn nodes(&self) -> usize {
        self.decision_nodes + self.terminals
    }

    /// Total number of entries across all operation caches.
    pub fn cache_entries(&self) -> usize {
        self.caches.iter().map(|(_, s)| s.entries).sum()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} decision nodes, {} terminals, {} variables, next handle {}",
            self.decision_nodes, self.terminals, self.variables, self.next_handle
        )?;
        for (name, s) in &self.caches {
            writeln!(
                f,
                "  {:<8} {:>8} entries {:>10} hits {:>10} misses ({:.1}%)",
                name,
                s.entries,
                s.hits,
                s.misses,
                100.0 * s.hit_rate()
            )?;
        }
        Ok(())
    }
}

/// All nodes reachable from `roots`, terminals included.
pub(crate) fn reachable(table: &NodeTable, roots: &[Ref]) -> FxHashSet<Ref> {
    let mut seen = FxHashSet::default();
    let mut stack: Vec<Ref> = roots.to_vec();
    while let Some(node) = stack.pop() {
        let Some(n) = table.get(node) else {
            continue;
        };
        if !seen.insert(node) {
            continue;
        }
        if let Node::Decision(d) = n {
            stack.push(d.low);
            stack.push(d.high);
        }
    }
    seen
}

impl Mtbdd {
    /// Drop every node not reachable from `roots`. Returns the number of
    /// removed nodes.
    ///
    /// The boolean terminals always survive. Operation caches are left
    /// alone: their entries for collected nodes fail validation on lookup.
    pub fn garbage_collect(&self, roots: &[Ref]) -> usize {
        let mut state = self.write();
        let before = state.table.len();
        let alive = reachable(&state.table, roots);
        let removed = state.table.retain(&alive);
        info!(
            "garbage collection: {} roots, {} -> {} nodes ({} removed)",
            roots.len(),
            before,
            state.table.len(),
            removed
        );
        removed
    }

    /// Number of nodes reachable from `f`, terminals included.
    pub fn size(&self, f: Ref) -> usize {
        reachable(&self.read().table, &[f]).len()
    }

    /// Number of nodes reachable from any of `roots`, shared nodes counted once.
    pub fn shared_size(&self, roots: &[Ref]) -> usize {
        reachable(&self.read().table, roots).len()
    }

    pub fn stats(&self) -> Stats {
        let state = self.read();
        Stats {
            decision_nodes: state.table.num_decisions(),
            terminals: state.table.num_terminals(),
            next_handle: state.table.next_handle(),
            variables: state.registry.len(),
            caches: state.caches.stats(),
        }
    }

    /// Empty all five operation caches.
    pub fn clear_caches(&self) {
        self.write().caches.clear();
    }
}
