//! Structural transforms: restriction, composition, renaming and the
//! relational image/preimage built on top of them.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashMap;

use crate::cache::{ComposeKey, ComposeOp, Substitution};
use crate::error::VariableError;
use crate::mtbdd::Mtbdd;
use crate::reference::Ref;
use crate::registry::is_valid_name;
use crate::types::{Assignment, Level};

impl Mtbdd {
    /// Fix `variable` to `value` in `f`.
    ///
    /// Restricting an undeclared variable is the identity.
    pub fn restrict(&self, f: Ref, variable: &str, value: bool) -> Ref {
        debug!("restrict(f = {}, {} = {})", f, variable, value);
        let Some(level) = self.level(variable) else {
            debug!("restrict: `{}` is not declared", variable);
            return f;
        };
        let mut memo = FxHashMap::default();
        self.restrict_(f, level, value, &mut memo)
    }

    fn restrict_(&self, f: Ref, level: Level, value: bool, memo: &mut FxHashMap<Ref, Ref>) -> Ref {
        let Some(node) = self.decision(f) else {
            return f;
        };
        if node.level > level {
            return f;
        }
        if node.level == level {
            return if value { node.high } else { node.low };
        }
        if let Some(&res) = memo.get(&f) {
            return res;
        }
        let low = self.restrict_(node.low, level, value, memo);
        let high = self.restrict_(node.high, level, value, memo);
        let res = self.mk(&node.variable, node.level, low, high);
        memo.insert(f, res);
        res
    }

    /// Restrict `f` by every pair of a (partial) assignment.
    pub fn cofactor(&self, f: Ref, assignment: &Assignment) -> Ref {
        debug!("cofactor(f = {}, assignment = {:?})", f, assignment);
        assignment
            .iter()
            .fold(f, |acc, (variable, &value)| self.restrict(acc, variable, value))
    }

    /// Simultaneously substitute diagrams for variables.
    ///
    /// Undeclared variables in the substitution are ignored; for repeated
    /// variables the last entry wins.
    pub fn compose<S: AsRef<str>>(&self, f: Ref, substitution: &[(S, Ref)]) -> Ref {
        debug!("compose(f = {}, {} substitutions)", f, substitution.len());
        let normalized = {
            let state = self.read();
            let mut map = BTreeMap::new();
            for (variable, g) in substitution {
                match state.registry.resolve(variable.as_ref()) {
                    Ok((name, _)) => {
                        map.insert(name, *g);
                    }
                    Err(e) => debug!("compose: ignoring {}", e),
                }
            }
            map
        };
        self.compose_with(ComposeOp::Compose, f, normalized)
    }

    /// Rename variables: each `(from, to)` pair replaces `from` by `to`.
    ///
    /// The renaming is simultaneous, so swapping two variables works. Sources
    /// that are not declared are ignored; for repeated sources the last entry
    /// wins. A declared target takes the place of the source at its own level.
    /// An undeclared target is not declared: nodes of the source are relabelled
    /// with the target name and keep the source's level.
    pub fn rename<S: AsRef<str>, T: AsRef<str>>(&self, f: Ref, mapping: &[(S, T)]) -> Result<Ref, VariableError> {
        debug!("rename(f = {}, {} pairs)", f, mapping.len());
        let mut pairs: BTreeMap<Arc<str>, (Level, &str)> = BTreeMap::new();
        for (from, to) in mapping {
            let to = to.as_ref();
            if !is_valid_name(to) {
                return Err(VariableError::InvalidName(to.to_string()));
            }
            let source = self.read().registry.resolve(from.as_ref());
            match source {
                Ok((name, level)) => {
                    pairs.insert(name, (level, to));
                }
                Err(e) => debug!("rename: ignoring {}", e),
            }
        }

        let mut substitution = BTreeMap::new();
        let mut relabel: FxHashMap<Level, Arc<str>> = FxHashMap::default();
        for (name, (level, to)) in pairs {
            if self.is_declared(to) {
                substitution.insert(name, self.var(to)?);
            } else {
                debug!("rename: `{}` is not declared, relabelling `{}` at {}", to, name, level);
                relabel.insert(level, Arc::from(to));
            }
        }

        let relabelled = match relabel.keys().max() {
            Some(&deepest) => {
                let mut memo = FxHashMap::default();
                self.relabel_(f, &relabel, deepest, &mut memo)
            }
            None => f,
        };
        Ok(self.compose_with(ComposeOp::Rename, relabelled, substitution))
    }

    fn relabel_(&self, f: Ref, names: &FxHashMap<Level, Arc<str>>, deepest: Level, memo: &mut FxHashMap<Ref, Ref>) -> Ref {
        let Some(node) = self.decision(f) else {
            return f;
        };
        if node.level > deepest {
            return f;
        }
        if let Some(&res) = memo.get(&f) {
            return res;
        }
        let low = self.relabel_(node.low, names, deepest, memo);
        let high = self.relabel_(node.high, names, deepest, memo);
        let variable = names.get(&node.level).unwrap_or(&node.variable);
        let res = self.mk(variable, node.level, low, high);
        memo.insert(f, res);
        res
    }

    fn compose_with(&self, op: ComposeOp, f: Ref, substitution: BTreeMap<Arc<str>, Ref>) -> Ref {
        if substitution.is_empty() || self.is_terminal(f) {
            return f;
        }
        let substitution: Substitution = substitution.into_iter().collect();
        let key = ComposeKey {
            op,
            f,
            substitution: Arc::clone(&substitution),
        };
        let cached = {
            let state = self.read();
            state.caches.compose.get(&key).filter(|&res| state.table.contains(res))
        };
        if let Some(res) = cached {
            debug!("cache: {:?}(f = {}) -> {}", op, f, res);
            return res;
        }

        let by_level: FxHashMap<Level, Ref> = {
            let state = self.read();
            substitution
                .iter()
                .filter_map(|(name, g)| state.registry.level(name).map(|level| (level, *g)))
                .collect()
        };
        let Some(&deepest) = by_level.keys().max() else {
            return f;
        };

        let mut memo = FxHashMap::default();
        let res = self.compose_(f, &by_level, deepest, &mut memo);
        debug!("computed: {:?}(f = {}) -> {}", op, f, res);
        self.write().caches.compose.insert(key, res);
        res
    }

    fn compose_(&self, f: Ref, by_level: &FxHashMap<Level, Ref>, deepest: Level, memo: &mut FxHashMap<Ref, Ref>) -> Ref {
        let Some(node) = self.decision(f) else {
            return f;
        };
        if node.level > deepest {
            return f;
        }
        if let Some(&res) = memo.get(&f) {
            return res;
        }
        let low = self.compose_(node.low, by_level, deepest, memo);
        let high = self.compose_(node.high, by_level, deepest, memo);
        let test = match by_level.get(&node.level) {
            Some(&g) => g,
            None => self.mk(&node.variable, node.level, Ref::FALSE, Ref::TRUE),
        };
        let res = self.ite(test, high, low);
        memo.insert(f, res);
        res
    }

    /// Successor states: `∃ current. (states ∧ transition)`.
    ///
    /// The result is expressed over the next-state variables.
    pub fn image<S: AsRef<str>>(&self, states: Ref, transition: Ref, current: &[S]) -> Ref {
        debug!("image(states = {}, transition = {})", states, transition);
        let conj = self.and(states, transition);
        self.exists(conj, current)
    }

    /// Predecessor states: `∃ next. (states[current := next] ∧ transition)`.
    pub fn preimage<S: AsRef<str>, T: AsRef<str>>(
        &self,
        states: Ref,
        transition: Ref,
        current: &[S],
        next: &[T],
    ) -> Result<Ref, VariableError> {
        debug!("preimage(states = {}, transition = {})", states, transition);
        if current.len() != next.len() {
            return Err(VariableError::MismatchedVariables {
                current: current.len(),
                next: next.len(),
            });
        }
        let mapping: Vec<(&str, &str)> = current.iter().zip(next).map(|(c, n)| (c.as_ref(), n.as_ref())).collect();
        let primed = self.rename(states, &mapping)?;
        let conj = self.and(primed, transition);
        Ok(self.exists(conj, next))
    }
}
