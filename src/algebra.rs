//! Value algebra: the terminal-level functions behind every arithmetic and
//! comparison operator.
//!
//! These functions are only ever called at the terminal base cases of the
//! apply recursion (see [`crate::apply`]); everything above the terminals is
//! Shannon decomposition.
//!
//! # Numeric coercion
//!
//! Booleans count as the integers 0 and 1. If both operands are integer-typed,
//! `+ - *` stay in the integer domain (falling back to floats on overflow);
//! otherwise both operands are promoted to `f64`. Non-numeric operands
//! (`nil`, strings, opaque tokens) coerce to integer zero.
//!
//! # Comparison
//!
//! Numeric if both operands have a numeric view, lexicographic if both are
//! strings. Any other pair only supports `=`, which falls back to raw value
//! equality; ordering operators on such pairs yield `false`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::value::{Number, Value};

/// Binary operator tag. Also used as the operation tag of the binary cache.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Max,
    Min,
    Equal,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// Unary operator tag. Also used as the operation tag of the unary cache.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Abs,
    Ceil,
    Floor,
}

impl BinaryOp {
    /// Apply the operator to two terminal values.
    pub fn apply(self, a: &Value, b: &Value) -> Value {
        match self {
            BinaryOp::Add => arithmetic(a, b, i64::checked_add, |x, y| x + y),
            BinaryOp::Subtract => arithmetic(a, b, i64::checked_sub, |x, y| x - y),
            BinaryOp::Multiply => arithmetic(a, b, i64::checked_mul, |x, y| x * y),
            BinaryOp::Max => extremum(a, b, Ordering::Greater),
            BinaryOp::Min => extremum(a, b, Ordering::Less),
            BinaryOp::Equal => Value::Bool(equal(a, b)),
            BinaryOp::LessThan => Value::Bool(compare(a, b) == Some(Ordering::Less)),
            BinaryOp::LessEqual => Value::Bool(matches!(compare(a, b), Some(Ordering::Less | Ordering::Equal))),
            BinaryOp::GreaterThan => Value::Bool(compare(a, b) == Some(Ordering::Greater)),
            BinaryOp::GreaterEqual => Value::Bool(matches!(compare(a, b), Some(Ordering::Greater | Ordering::Equal))),
        }
    }

    /// Whether `op(a, b) == op(b, a)` for all terminal values, so that cache
    /// keys can be normalized.
    ///
    /// `max`/`min` are excluded: on ties they return the left operand, whose
    /// kind may differ from the right one.
    pub fn is_commutative(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Multiply | BinaryOp::Equal)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Max => "max",
            BinaryOp::Min => "min",
            BinaryOp::Equal => "=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

impl UnaryOp {
    /// Apply the operator to a terminal value.
    pub fn apply(self, a: &Value) -> Value {
        let Some(x) = a.to_number() else {
            return Value::Int(0);
        };
        match (self, x) {
            (UnaryOp::Negate, Number::Int(x)) => x.checked_neg().map_or(Value::Float(-(x as f64)), Value::Int),
            (UnaryOp::Negate, Number::Float(x)) => Value::Float(-x),
            (UnaryOp::Abs, Number::Int(x)) => x.checked_abs().map_or(Value::Float((x as f64).abs()), Value::Int),
            (UnaryOp::Abs, Number::Float(x)) => Value::Float(x.abs()),
            (UnaryOp::Ceil | UnaryOp::Floor, Number::Int(x)) => Value::Int(x),
            (UnaryOp::Ceil, Number::Float(x)) => Value::Float(x.ceil()),
            (UnaryOp::Floor, Number::Float(x)) => Value::Float(x.floor()),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Floor => "floor",
        }
    }
}

fn arithmetic(a: &Value, b: &Value, int_op: fn(i64, i64) -> Option<i64>, float_op: fn(f64, f64) -> f64) -> Value {
    let x = a.to_number().unwrap_or(Number::Int(0));
    let y = b.to_number().unwrap_or(Number::Int(0));
    match (x, y) {
        (Number::Int(x), Number::Int(y)) => match int_op(x, y) {
            Some(z) => Value::Int(z),
            None => Value::Float(float_op(x as f64, y as f64)),
        },
        _ => Value::Float(float_op(x.as_f64(), y.as_f64())),
    }
}

/// Ordering between two values, if they are comparable.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a.to_number(), b.to_number()) {
        (Some(Number::Int(x)), Some(Number::Int(y))) => Some(x.cmp(&y)),
        (Some(x), Some(y)) => x.as_f64().partial_cmp(&y.as_f64()),
        _ => match (a, b) {
            (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
            _ => None,
        },
    }
}

fn equal(a: &Value, b: &Value) -> bool {
    if a.is_numeric() && b.is_numeric() {
        compare(a, b) == Some(Ordering::Equal)
    } else {
        match compare(a, b) {
            Some(ordering) => ordering == Ordering::Equal,
            None => a == b,
        }
    }
}

/// `max` (`want == Greater`) or `min` (`want == Less`), returning one of the
/// original operands unchanged. A numeric operand always beats a non-numeric
/// one; ties and incomparable pairs keep the left operand.
fn extremum(a: &Value, b: &Value, want: Ordering) -> Value {
    match (a.is_numeric(), b.is_numeric()) {
        (true, false) => a.clone(),
        (false, true) => b.clone(),
        _ => {
            if compare(b, a) == Some(want) {
                b.clone()
            } else {
                a.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(BinaryOp::Add.apply(&Value::Int(2), &Value::Int(3)), Value::Int(5));
        assert_eq!(BinaryOp::Subtract.apply(&Value::Int(2), &Value::Int(3)), Value::Int(-1));
        assert_eq!(BinaryOp::Multiply.apply(&Value::Int(4), &Value::Int(3)), Value::Int(12));
    }

    #[test]
    fn test_float_promotion() {
        assert_eq!(BinaryOp::Add.apply(&Value::Int(2), &Value::Float(2.5)), Value::Float(4.5));
        assert_eq!(BinaryOp::Multiply.apply(&Value::Float(0.5), &Value::Int(4)), Value::Float(2.0));
    }

    #[test]
    fn test_booleans_are_integers() {
        assert_eq!(BinaryOp::Add.apply(&Value::Bool(true), &Value::Bool(true)), Value::Int(2));
        assert_eq!(BinaryOp::Add.apply(&Value::Bool(true), &Value::Int(4)), Value::Int(5));
    }

    #[test]
    fn test_non_numeric_is_zero() {
        assert_eq!(BinaryOp::Add.apply(&Value::from("x"), &Value::Int(4)), Value::Int(4));
        assert_eq!(BinaryOp::Multiply.apply(&Value::Nil, &Value::Int(4)), Value::Int(0));
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        let res = BinaryOp::Add.apply(&Value::Int(i64::MAX), &Value::Int(1));
        assert_eq!(res, Value::Float(i64::MAX as f64 + 1.0));
    }

    #[test]
    fn test_max_min_preserve_type() {
        assert_eq!(BinaryOp::Max.apply(&Value::Int(3), &Value::Float(2.5)), Value::Int(3));
        assert_eq!(BinaryOp::Max.apply(&Value::Int(2), &Value::Float(2.5)), Value::Float(2.5));
        assert_eq!(BinaryOp::Min.apply(&Value::Int(2), &Value::Float(2.5)), Value::Int(2));
        assert_eq!(BinaryOp::Max.apply(&Value::Bool(true), &Value::Int(0)), Value::Bool(true));
    }

    #[test]
    fn test_max_non_numeric_loses() {
        assert_eq!(BinaryOp::Max.apply(&Value::from("zzz"), &Value::Int(-10)), Value::Int(-10));
        assert_eq!(BinaryOp::Min.apply(&Value::Nil, &Value::Int(7)), Value::Int(7));
        assert_eq!(BinaryOp::Max.apply(&Value::from("a"), &Value::from("b")), Value::from("b"));
    }

    #[test]
    fn test_unary() {
        assert_eq!(UnaryOp::Negate.apply(&Value::Int(3)), Value::Int(-3));
        assert_eq!(UnaryOp::Negate.apply(&Value::Float(1.5)), Value::Float(-1.5));
        assert_eq!(UnaryOp::Abs.apply(&Value::Int(-3)), Value::Int(3));
        assert_eq!(UnaryOp::Ceil.apply(&Value::Float(1.2)), Value::Float(2.0));
        assert_eq!(UnaryOp::Floor.apply(&Value::Float(1.8)), Value::Float(1.0));
        assert_eq!(UnaryOp::Ceil.apply(&Value::Int(7)), Value::Int(7));
        assert_eq!(UnaryOp::Floor.apply(&Value::from("x")), Value::Int(0));
        assert_eq!(UnaryOp::Negate.apply(&Value::Bool(true)), Value::Int(-1));
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(BinaryOp::LessThan.apply(&Value::Int(1), &Value::Float(1.5)), Value::Bool(true));
        assert_eq!(BinaryOp::Equal.apply(&Value::Int(2), &Value::Float(2.0)), Value::Bool(true));
        assert_eq!(BinaryOp::GreaterEqual.apply(&Value::Bool(true), &Value::Int(1)), Value::Bool(true));
        assert_eq!(BinaryOp::GreaterThan.apply(&Value::Int(1), &Value::Int(1)), Value::Bool(false));
    }

    #[test]
    fn test_string_comparison() {
        assert_eq!(BinaryOp::LessThan.apply(&Value::from("abc"), &Value::from("abd")), Value::Bool(true));
        assert_eq!(BinaryOp::Equal.apply(&Value::from("a"), &Value::from("a")), Value::Bool(true));
    }

    #[test]
    fn test_incomparable() {
        let s = Value::from("1");
        let n = Value::Int(1);
        assert_eq!(BinaryOp::LessThan.apply(&s, &n), Value::Bool(false));
        assert_eq!(BinaryOp::GreaterEqual.apply(&s, &n), Value::Bool(false));
        assert_eq!(BinaryOp::Equal.apply(&s, &n), Value::Bool(false));
        assert_eq!(BinaryOp::Equal.apply(&Value::Opaque(3), &Value::Opaque(3)), Value::Bool(true));
        assert_eq!(BinaryOp::Equal.apply(&Value::Nil, &Value::Nil), Value::Bool(true));
    }

    #[test]
    fn test_nan_is_never_equal() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(BinaryOp::Equal.apply(&nan, &nan), Value::Bool(false));
        assert_eq!(BinaryOp::LessEqual.apply(&nan, &Value::Int(0)), Value::Bool(false));
    }
}
