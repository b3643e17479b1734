//! Builders for linear, counting and weighted functions.
//!
//! All of them fold a term list bottom-up (deepest variable first) through
//! `ite(x, f + c, f)`.

use log::debug;

use crate::error::VariableError;
use crate::mtbdd::Mtbdd;
use crate::reference::Ref;
use crate::value::Value;

impl Mtbdd {
    /// `constant + Σ coefficient·x` as a multi-terminal diagram.
    ///
    /// ```
    /// use mtbdd_rs::mtbdd::Mtbdd;
    /// use mtbdd_rs::types::assignment;
    /// use mtbdd_rs::value::Value;
    ///
    /// let mtbdd = Mtbdd::new();
    /// mtbdd.declare(["x", "y"]);
    /// let f = mtbdd.linear_function([("x", 2), ("y", 3)], 5).unwrap();
    /// let a = assignment([("x", true), ("y", false)]);
    /// assert_eq!(mtbdd.evaluate(f, &a), Value::Int(7));
    /// ```
    pub fn linear_function<S, C>(
        &self,
        terms: impl IntoIterator<Item = (S, C)>,
        constant: impl Into<Value>,
    ) -> Result<Ref, VariableError>
    where
        S: AsRef<str>,
        C: Into<Value>,
    {
        let mut resolved = Vec::new();
        for (name, coefficient) in terms {
            let name = name.as_ref();
            let level = self.level(name).ok_or_else(|| VariableError::Undeclared(name.to_string()))?;
            resolved.push((level, self.var(name)?, coefficient.into()));
        }
        resolved.sort_by(|a, b| b.0.cmp(&a.0));

        let mut f = self.constant(constant);
        for (level, x, coefficient) in resolved {
            debug!("linear_function: term {} at {}", coefficient, level);
            let c = self.terminal(coefficient);
            let shifted = self.add(f, c);
            f = self.ite(x, shifted, f);
        }
        Ok(f)
    }

    /// Number of true variables among `vars`.
    pub fn counting_function<S: AsRef<str>>(&self, vars: &[S]) -> Result<Ref, VariableError> {
        self.linear_function(vars.iter().map(|v| (v.as_ref(), 1)), 0)
    }

    /// Boolean diagram: exactly `k` of `vars` are true.
    pub fn counting_solution<S: AsRef<str>>(&self, vars: &[S], k: i64) -> Result<Ref, VariableError> {
        let count = self.counting_function(vars)?;
        let k = self.constant(k);
        Ok(self.equal(count, k))
    }

    /// Boolean diagram: `Σ weight·x >= threshold`.
    pub fn weighted_formula<S, C>(
        &self,
        terms: impl IntoIterator<Item = (S, C)>,
        threshold: impl Into<Value>,
    ) -> Result<Ref, VariableError>
    where
        S: AsRef<str>,
        C: Into<Value>,
    {
        let sum = self.linear_function(terms, 0)?;
        Ok(self.threshold(sum, threshold))
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use test_log::test;

    use crate::error::VariableError;
    use crate::mtbdd::tests::{all_assignments, setup};
    use crate::types::assignment;
    use crate::value::Value;

    #[test]
    fn test_linear_function() {
        let (mtbdd, _) = setup(&["x", "y"]);
        let f = mtbdd.linear_function([("x", 2), ("y", 3)], 5).unwrap();
        assert_eq!(mtbdd.evaluate(f, &assignment([("x", true), ("y", false)])), Value::Int(7));
        assert_eq!(mtbdd.evaluate(f, &assignment([("x", true), ("y", true)])), Value::Int(10));
        assert_eq!(mtbdd.evaluate(f, &assignment([("x", false), ("y", false)])), Value::Int(5));
    }

    #[test]
    fn test_linear_function_float_coefficients() {
        let (mtbdd, _) = setup(&["x"]);
        let f = mtbdd.linear_function([("x", 0.5)], 1).unwrap();
        assert_eq!(mtbdd.evaluate(f, &assignment([("x", true)])), Value::Float(1.5));
        assert_eq!(mtbdd.evaluate(f, &assignment([("x", false)])), Value::Int(1));
    }

    #[test]
    fn test_linear_function_order_independent() {
        let (mtbdd, _) = setup(&["a", "b", "c"]);
        let f = mtbdd.linear_function([("a", 1), ("b", 2), ("c", 4)], 0).unwrap();
        let g = mtbdd.linear_function([("c", 4), ("a", 1), ("b", 2)], 0).unwrap();
        assert_eq!(f, g);
    }

    #[test]
    fn test_linear_function_undeclared() {
        let (mtbdd, _) = setup(&["x"]);
        assert_eq!(
            mtbdd.linear_function([("z", 1)], 0),
            Err(VariableError::Undeclared("z".to_string()))
        );
    }

    #[test]
    fn test_counting() {
        let names = ["a", "b", "c", "d"];
        let (mtbdd, _) = setup(&names);
        let count = mtbdd.counting_function(&names).unwrap();
        let two = mtbdd.counting_solution(&names, 2).unwrap();
        for a in all_assignments(&names) {
            let ones = a.values().filter(|&&b| b).count() as i64;
            assert_eq!(mtbdd.evaluate(count, &a), Value::Int(ones));
            assert_eq!(mtbdd.evaluate(two, &a), Value::Bool(ones == 2));
        }
        assert_eq!(mtbdd.count_sat(two), BigUint::from(6u32));
    }

    #[test]
    fn test_weighted_formula() {
        let (mtbdd, _) = setup(&["x", "y", "z"]);
        let f = mtbdd.weighted_formula([("x", 3), ("y", 2), ("z", 1)], 4).unwrap();
        for a in all_assignments(&["x", "y", "z"]) {
            let sum = 3 * a["x"] as i64 + 2 * a["y"] as i64 + a["z"] as i64;
            assert_eq!(mtbdd.evaluate(f, &a), Value::Bool(sum >= 4));
        }
    }
}
