//! Arithmetic and comparison operators lifted to diagrams.
//!
//! Binary and unary operators share the shape of ITE without a condition:
//! terminal operands go through the value algebra, everything else is split
//! on the topmost variable and rebuilt.

use log::debug;

use crate::algebra::{BinaryOp, UnaryOp};
use crate::cache::{BinaryKey, UnaryKey};
use crate::mtbdd::Mtbdd;
use crate::reference::Ref;
use crate::value::Value;

impl Mtbdd {
    /// Apply a binary operator pointwise.
    pub fn apply(&self, op: BinaryOp, f: Ref, g: Ref) -> Ref {
        debug!("apply(op = {:?}, f = {}, g = {})", op, f, g);

        let key = BinaryKey::new(op, f, g);
        let cached = {
            let state = self.read();
            state.caches.binary.get(&key).filter(|&res| state.table.contains(res))
        };
        if let Some(res) = cached {
            debug!("cache: apply(op = {:?}, f = {}, g = {}) -> {}", op, f, g, res);
            return res;
        }

        let res = match (self.terminal_value(f), self.terminal_value(g)) {
            (Some(a), Some(b)) => {
                let value = op.apply(&a, &b);
                debug!("apply: {} {} {} = {}", a, op.symbol(), b, value);
                self.terminal(value)
            }
            _ => match self.split([f, g]) {
                Some(split) => {
                    let [(f0, f1), (g0, g1)] = split.cofactors;
                    let e = self.apply(op, f0, g0);
                    let t = self.apply(op, f1, g1);
                    self.mk(&split.variable, split.level, e, t)
                }
                None => Ref::FALSE,
            },
        };

        debug!("computed: apply(op = {:?}, f = {}, g = {}) -> {}", op, f, g, res);
        self.write().caches.binary.insert(key, res);
        res
    }

    /// Apply a unary operator pointwise.
    pub fn apply_unary(&self, op: UnaryOp, f: Ref) -> Ref {
        debug!("apply_unary(op = {:?}, f = {})", op, f);

        let key = UnaryKey { op, f };
        let cached = {
            let state = self.read();
            state.caches.unary.get(&key).filter(|&res| state.table.contains(res))
        };
        if let Some(res) = cached {
            debug!("cache: apply_unary(op = {:?}, f = {}) -> {}", op, f, res);
            return res;
        }

        let res = match self.terminal_value(f) {
            Some(a) => self.terminal(op.apply(&a)),
            None => match self.split([f]) {
                Some(split) => {
                    let [(f0, f1)] = split.cofactors;
                    let e = self.apply_unary(op, f0);
                    let t = self.apply_unary(op, f1);
                    self.mk(&split.variable, split.level, e, t)
                }
                None => Ref::FALSE,
            },
        };

        self.write().caches.unary.insert(key, res);
        res
    }

    pub fn add(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::Add, f, g)
    }

    pub fn subtract(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::Subtract, f, g)
    }

    pub fn multiply(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::Multiply, f, g)
    }

    pub fn max(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::Max, f, g)
    }

    pub fn min(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::Min, f, g)
    }

    pub fn negate(&self, f: Ref) -> Ref {
        self.apply_unary(UnaryOp::Negate, f)
    }

    pub fn abs(&self, f: Ref) -> Ref {
        self.apply_unary(UnaryOp::Abs, f)
    }

    pub fn ceil(&self, f: Ref) -> Ref {
        self.apply_unary(UnaryOp::Ceil, f)
    }

    pub fn floor(&self, f: Ref) -> Ref {
        self.apply_unary(UnaryOp::Floor, f)
    }

    pub fn equal(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::Equal, f, g)
    }

    pub fn less_than(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::LessThan, f, g)
    }

    pub fn less_equal(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::LessEqual, f, g)
    }

    pub fn greater_than(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::GreaterThan, f, g)
    }

    pub fn greater_equal(&self, f: Ref, g: Ref) -> Ref {
        self.apply(BinaryOp::GreaterEqual, f, g)
    }

    /// `f >= k` for a fixed constant `k`.
    pub fn threshold(&self, f: Ref, k: impl Into<Value>) -> Ref {
        let k = self.constant(k);
        self.greater_equal(f, k)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::mtbdd::tests::{all_assignments, setup};
    use crate::mtbdd::Mtbdd;
    use crate::reference::Ref;
    use crate::value::Value;

    #[test]
    fn test_constant_arithmetic_type() {
        let mtbdd = Mtbdd::new();
        let two = mtbdd.constant(2);
        let three = mtbdd.constant(3);
        let two_and_half = mtbdd.constant(2.5);
        assert_eq!(mtbdd.add(two, three), mtbdd.constant(5));
        assert_eq!(mtbdd.terminal_value(mtbdd.add(two, two_and_half)), Some(Value::Float(4.5)));
    }

    #[test]
    fn test_add_over_variables() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let fx = mtbdd.ite(v[0], mtbdd.constant(2), mtbdd.constant(0));
        let fy = mtbdd.ite(v[1], mtbdd.constant(3), mtbdd.constant(0));
        let sum = mtbdd.add(fx, fy);
        for a in all_assignments(&["x", "y"]) {
            let expected = if a["x"] { 2 } else { 0 } + if a["y"] { 3 } else { 0 };
            assert_eq!(mtbdd.evaluate(sum, &a), Value::Int(expected));
        }
    }

    #[test]
    fn test_boolean_operands_count_as_integers() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let sum = mtbdd.add(v[0], v[1]);
        let a = crate::types::assignment([("x", true), ("y", true)]);
        assert_eq!(mtbdd.evaluate(sum, &a), Value::Int(2));
    }

    #[test]
    fn test_subtract_multiply() {
        let (mtbdd, v) = setup(&["x"]);
        let f = mtbdd.ite(v[0], mtbdd.constant(4), mtbdd.constant(1));
        let g = mtbdd.constant(3);
        let d = mtbdd.subtract(f, g);
        let p = mtbdd.multiply(f, g);
        assert_eq!(mtbdd.low(d), Some(mtbdd.constant(-2)));
        assert_eq!(mtbdd.high(d), Some(mtbdd.constant(1)));
        assert_eq!(mtbdd.low(p), Some(mtbdd.constant(3)));
        assert_eq!(mtbdd.high(p), Some(mtbdd.constant(12)));
    }

    #[test]
    fn test_commutative_cache() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let a = mtbdd.add(v[0], v[1]);
        let hits = mtbdd.read().caches.binary.hits();
        let b = mtbdd.add(v[1], v[0]);
        assert_eq!(a, b);
        assert!(mtbdd.read().caches.binary.hits() > hits);
    }

    #[test]
    fn test_max_min() {
        let (mtbdd, v) = setup(&["x"]);
        let f = mtbdd.ite(v[0], mtbdd.constant(10), mtbdd.constant(-1));
        let g = mtbdd.constant(2.5);
        let hi = mtbdd.max(f, g);
        let lo = mtbdd.min(f, g);
        assert_eq!(mtbdd.high(hi), Some(mtbdd.constant(10)));
        assert_eq!(mtbdd.low(hi), Some(mtbdd.constant(2.5)));
        assert_eq!(mtbdd.high(lo), Some(mtbdd.constant(2.5)));
        assert_eq!(mtbdd.low(lo), Some(mtbdd.constant(-1)));
    }

    #[test]
    fn test_unary_ops() {
        let (mtbdd, v) = setup(&["x"]);
        let f = mtbdd.ite(v[0], mtbdd.constant(-1.5), mtbdd.constant(3));
        assert_eq!(mtbdd.high(mtbdd.negate(f)), Some(mtbdd.constant(1.5)));
        assert_eq!(mtbdd.low(mtbdd.negate(f)), Some(mtbdd.constant(-3)));
        assert_eq!(mtbdd.high(mtbdd.abs(f)), Some(mtbdd.constant(1.5)));
        assert_eq!(mtbdd.high(mtbdd.ceil(f)), Some(mtbdd.constant(-1.0)));
        assert_eq!(mtbdd.high(mtbdd.floor(f)), Some(mtbdd.constant(-2.0)));
        assert_eq!(mtbdd.low(mtbdd.floor(f)), Some(mtbdd.constant(3)));
    }

    #[test]
    fn test_comparisons_yield_boolean_diagrams() {
        let (mtbdd, v) = setup(&["x"]);
        let f = mtbdd.ite(v[0], mtbdd.constant(5), mtbdd.constant(1));
        let three = mtbdd.constant(3);
        assert_eq!(mtbdd.greater_than(f, three), v[0]);
        assert_eq!(mtbdd.less_than(f, three), mtbdd.not(v[0]));
        assert_eq!(mtbdd.equal(f, mtbdd.constant(5)), v[0]);
        assert_eq!(mtbdd.less_equal(f, mtbdd.constant(5)), Ref::TRUE);
        assert_eq!(mtbdd.greater_equal(f, mtbdd.constant(1)), Ref::TRUE);
        assert_eq!(mtbdd.threshold(f, 5), v[0]);
    }

    #[test]
    fn test_string_terminals() {
        let (mtbdd, v) = setup(&["x"]);
        let f = mtbdd.ite(v[0], mtbdd.constant("beta"), mtbdd.constant("alpha"));
        let cmp = mtbdd.less_than(f, mtbdd.constant("b"));
        assert_eq!(cmp, mtbdd.not(v[0]));
        let mixed = mtbdd.less_than(f, mtbdd.constant(1));
        assert_eq!(mixed, Ref::FALSE);
    }
}
