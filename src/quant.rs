//! Quantification and the fixpoint solver.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::cache::{QuantKey, Quantifier, VarSet};
use crate::mtbdd::Mtbdd;
use crate::reference::Ref;

/// How a fixpoint iteration ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Convergence {
    /// `f(x) == x`.
    Converged,
    /// An iterate repeated within the trailing history window.
    Oscillation,
    /// The iteration cap was hit.
    IterationLimit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FixpointResult {
    pub value: Ref,
    pub iterations: usize,
    pub convergence: Convergence,
}

impl Mtbdd {
    /// Existential quantification `∃ vars. f`.
    pub fn exists<S: AsRef<str>>(&self, f: Ref, vars: &[S]) -> Ref {
        self.quantify(Quantifier::Exists, f, vars)
    }

    /// Universal quantification `∀ vars. f`.
    pub fn for_all<S: AsRef<str>>(&self, f: Ref, vars: &[S]) -> Ref {
        self.quantify(Quantifier::ForAll, f, vars)
    }

    fn quantify<S: AsRef<str>>(&self, quantifier: Quantifier, f: Ref, vars: &[S]) -> Ref {
        debug!("{:?}(f = {}, {} vars)", quantifier, f, vars.len());

        // Declared names only, sorted and deduplicated.
        let vars: VarSet = {
            let state = self.read();
            let mut names: Vec<Arc<str>> = vars
                .iter()
                .filter_map(|v| state.registry.resolve(v.as_ref()).ok().map(|(name, _)| name))
                .collect();
            names.sort();
            names.dedup();
            names.into()
        };
        if vars.is_empty() || self.is_terminal(f) {
            return f;
        }

        let key = QuantKey {
            quantifier,
            f,
            vars: Arc::clone(&vars),
        };
        let cached = {
            let state = self.read();
            state.caches.quant.get(&key).filter(|&res| state.table.contains(res))
        };
        if let Some(res) = cached {
            debug!("cache: {:?}(f = {}) -> {}", quantifier, f, res);
            return res;
        }

        let support = self.support_names(f);
        let mut res = f;
        for v in vars.iter() {
            if !support.contains(v) {
                debug!("{:?}: `{}` not in support", quantifier, v);
                continue;
            }
            let low = self.restrict(res, v, false);
            let high = self.restrict(res, v, true);
            res = match quantifier {
                Quantifier::Exists => self.or(low, high),
                Quantifier::ForAll => self.and(low, high),
            };
        }

        debug!("computed: {:?}(f = {}) -> {}", quantifier, f, res);
        self.write().caches.quant.insert(key, res);
        res
    }

    /// Iterate `transformer` from `start` until it stabilizes.
    ///
    /// Stops on exact convergence, on a repeat of one of the last
    /// `fixpoint_history` iterates (returning the current iterate), or after
    /// `max_fixpoint_iterations` steps.
    pub fn fixpoint(&self, transformer: impl FnMut(Ref) -> Ref, start: Ref) -> FixpointResult {
        let mut transformer = transformer;
        match self.try_fixpoint(|x| Ok::<_, Infallible>(transformer(x)), start) {
            Ok(res) => res,
            Err(never) => match never {},
        }
    }

    /// [`fixpoint`][Mtbdd::fixpoint] for fallible transformers.
    pub fn try_fixpoint<E>(
        &self,
        mut transformer: impl FnMut(Ref) -> Result<Ref, E>,
        start: Ref,
    ) -> Result<FixpointResult, E> {
        let max_iterations = self.config().max_fixpoint_iterations;
        let history_size = self.config().fixpoint_history;

        let mut history: VecDeque<Ref> = VecDeque::with_capacity(history_size + 1);
        let mut current = start;
        for i in 1..=max_iterations {
            let next = transformer(current)?;
            if next == current {
                info!("fixpoint converged after {} iterations", i);
                return Ok(FixpointResult {
                    value: current,
                    iterations: i,
                    convergence: Convergence::Converged,
                });
            }
            if history.contains(&next) {
                warn!("fixpoint oscillates after {} iterations, stopping at {}", i, current);
                return Ok(FixpointResult {
                    value: current,
                    iterations: i,
                    convergence: Convergence::Oscillation,
                });
            }
            history.push_back(current);
            if history.len() > history_size {
                history.pop_front();
            }
            current = next;
        }
        warn!("fixpoint did not converge within {} iterations", max_iterations);
        Ok(FixpointResult {
            value: current,
            iterations: max_iterations,
            convergence: Convergence::IterationLimit,
        })
    }

    /// Least fixpoint, iterating upwards from `bottom`.
    pub fn least_fixpoint(&self, transformer: impl FnMut(Ref) -> Ref, bottom: Ref) -> Ref {
        debug!("least_fixpoint(bottom = {})", bottom);
        self.fixpoint(transformer, bottom).value
    }

    /// Greatest fixpoint, iterating downwards from `top`.
    pub fn greatest_fixpoint(&self, transformer: impl FnMut(Ref) -> Ref, top: Ref) -> Ref {
        debug!("greatest_fixpoint(top = {})", top);
        self.fixpoint(transformer, top).value
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::config::MtbddConfig;
    use crate::mtbdd::tests::{all_assignments, setup};

    #[test]
    fn test_exists_and() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let f = mtbdd.and(v[0], v[1]);
        assert_eq!(mtbdd.exists(f, &["x"]), v[1]);
    }

    #[test]
    fn test_for_all_implies() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let f = mtbdd.implies(v[0], v[1]);
        assert_eq!(mtbdd.for_all(f, &["x"]), v[1]);
    }

    #[test]
    fn test_exists_order_and_duplicates() {
        let (mtbdd, v) = setup(&["x", "y", "z"]);
        let f = mtbdd.or(mtbdd.and(v[0], v[1]), mtbdd.and(mtbdd.not(v[1]), v[2]));
        let a = mtbdd.exists(f, &["x", "y"]);
        mtbdd.clear_caches();
        let b = mtbdd.exists(f, &["y", "x"]);
        let c = mtbdd.exists(f, &["y", "x", "y", "x"]);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, Ref::TRUE);
    }

    #[test]
    fn test_quantify_missing_variables() {
        let (mtbdd, v) = setup(&["x", "y"]);
        assert_eq!(mtbdd.exists(v[0], &["y"]), v[0]);
        assert_eq!(mtbdd.exists(v[0], &["undeclared"]), v[0]);
        assert_eq!(mtbdd.for_all(v[0], &[] as &[&str]), v[0]);
    }

    #[test]
    fn test_exists_all_is_tautology_check() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let f = mtbdd.xor(v[0], v[1]);
        assert_eq!(mtbdd.exists(f, &["x", "y"]), Ref::TRUE);
        assert_eq!(mtbdd.for_all(f, &["x", "y"]), Ref::FALSE);
    }

    #[test]
    fn test_quantified_semantics() {
        let (mtbdd, v) = setup(&["a", "b", "c"]);
        let f = mtbdd.or(mtbdd.and(v[0], v[1]), mtbdd.and(v[1], v[2]));
        let e = mtbdd.exists(f, &["b"]);
        let u = mtbdd.for_all(f, &["a"]);
        for asg in all_assignments(&["a", "b", "c"]) {
            let (a, b, c) = (asg["a"], asg["b"], asg["c"]);
            assert_eq!(mtbdd.evaluate(e, &asg).is_truthy(), a || c);
            assert_eq!(mtbdd.evaluate(u, &asg).is_truthy(), b && c);
        }
    }

    #[test]
    fn test_least_fixpoint_reachability() {
        let (mtbdd, v) = setup(&["a", "b"]);
        // Z ↦ a ∨ (b ∧ Z): converges to a
        let res = mtbdd.fixpoint(
            |z| {
                let bz = mtbdd.and(v[1], z);
                mtbdd.or(v[0], bz)
            },
            Ref::FALSE,
        );
        assert_eq!(res.convergence, Convergence::Converged);
        assert_eq!(res.value, v[0]);
        assert_eq!(mtbdd.least_fixpoint(|z| mtbdd.or(v[0], z), Ref::FALSE), v[0]);
    }

    #[test]
    fn test_greatest_fixpoint() {
        let (mtbdd, v) = setup(&["a", "b"]);
        let res = mtbdd.greatest_fixpoint(|z| mtbdd.and(v[0], z), Ref::TRUE);
        assert_eq!(res, v[0]);
    }

    #[test]
    fn test_oscillation_guard() {
        let (mtbdd, v) = setup(&["a"]);
        // Z ↦ ¬Z never converges: a, ¬a, a, ...
        let res = mtbdd.fixpoint(|z| mtbdd.not(z), v[0]);
        assert_eq!(res.convergence, Convergence::Oscillation);
        assert_eq!(res.iterations, 2);
        assert_eq!(res.value, mtbdd.not(v[0]));
    }

    #[test]
    fn test_iteration_limit() {
        let mtbdd = Mtbdd::with_config(MtbddConfig::default().with_max_fixpoint_iterations(25));
        // Z ↦ Z + 1 never repeats.
        let one = mtbdd.constant(1);
        let res = mtbdd.fixpoint(|z| mtbdd.add(z, one), mtbdd.constant(0));
        assert_eq!(res.convergence, Convergence::IterationLimit);
        assert_eq!(res.iterations, 25);
        assert_eq!(res.value, mtbdd.constant(25));
    }

    #[test]
    fn test_long_cycle_escapes_history() {
        let mtbdd = Mtbdd::with_config(
            MtbddConfig::default()
                .with_fixpoint_history(3)
                .with_max_fixpoint_iterations(40),
        );
        // Cycle of length 5 through the integers 0..5.
        let res = mtbdd.fixpoint(
            |z| {
                let n = mtbdd.terminal_value(z).and_then(|v| v.as_int()).unwrap_or(0);
                mtbdd.constant((n + 1) % 5)
            },
            mtbdd.constant(0),
        );
        assert_eq!(res.convergence, Convergence::IterationLimit);
    }

    #[test]
    fn test_try_fixpoint_propagates() {
        let (mtbdd, _) = setup(&["a"]);
        let res: Result<FixpointResult, &str> = mtbdd.try_fixpoint(|_| Err("boom"), Ref::FALSE);
        assert_eq!(res, Err("boom"));
    }
}
