//! Seam between an expression front end and the engine.
//!
//! Anything implementing [`Lower`] can be turned into a diagram with
//! [`Mtbdd::compile`]. Two implementations ship with the crate: lazy
//! operator sugar over existing handles (`x & y`, `!x`, ...) and a small
//! owned expression tree, [`Expr`].

use std::collections::BTreeSet;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Sub};

use log::debug;

use crate::error::ExprError;
use crate::mtbdd::Mtbdd;
use crate::reference::Ref;
use crate::value::Value;

/// Something that can be lowered into engine operations.
pub trait Lower {
    fn lower(&self, mtbdd: &Mtbdd) -> Result<Ref, ExprError>;

    /// Variable names referenced by the expression.
    fn free_variables(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

impl Mtbdd {
    /// Declare the free variables of `expr` (sorted by name, already
    /// declared ones keep their level) and lower it.
    pub fn compile(&self, expr: &impl Lower) -> Result<Ref, ExprError> {
        let vars = expr.free_variables();
        for name in &vars {
            self.try_declare(name)?;
        }
        debug!("compile: {} free variables", vars.len());
        expr.lower(self)
    }
}

impl Lower for Ref {
    fn lower(&self, _mtbdd: &Mtbdd) -> Result<Ref, ExprError> {
        Ok(*self)
    }
}

pub struct AndOp {
    f: Ref,
    g: Ref,
}

impl BitAnd for Ref {
    type Output = AndOp;

    fn bitand(self, rhs: Self) -> Self::Output {
        AndOp { f: self, g: rhs }
    }
}

pub struct OrOp {
    f: Ref,
    g: Ref,
}

impl BitOr for Ref {
    type Output = OrOp;

    fn bitor(self, rhs: Self) -> Self::Output {
        OrOp { f: self, g: rhs }
    }
}

pub struct XorOp {
    f: Ref,
    g: Ref,
}

impl BitXor for Ref {
    type Output = XorOp;

    fn bitxor(self, rhs: Self) -> Self::Output {
        XorOp { f: self, g: rhs }
    }
}

pub struct NotOp {
    f: Ref,
}

impl Not for Ref {
    type Output = NotOp;

    fn not(self) -> Self::Output {
        NotOp { f: self }
    }
}

impl Lower for AndOp {
    fn lower(&self, mtbdd: &Mtbdd) -> Result<Ref, ExprError> {
        Ok(mtbdd.and(self.f, self.g))
    }
}

impl Lower for OrOp {
    fn lower(&self, mtbdd: &Mtbdd) -> Result<Ref, ExprError> {
        Ok(mtbdd.or(self.f, self.g))
    }
}

impl Lower for XorOp {
    fn lower(&self, mtbdd: &Mtbdd) -> Result<Ref, ExprError> {
        Ok(mtbdd.xor(self.f, self.g))
    }
}

impl Lower for NotOp {
    fn lower(&self, mtbdd: &Mtbdd) -> Result<Ref, ExprError> {
        Ok(mtbdd.not(self.f))
    }
}

/// Owned expression tree, boolean and arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(String),
    Const(Value),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Equiv(Box<Expr>, Box<Expr>),
    Ite(Box<Expr>, Box<Expr>, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    /// Has no diagram form; lowering it fails.
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Max(Box<Expr>, Box<Expr>),
    Min(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Const(value.into())
    }

    pub fn implies(self, other: Self) -> Self {
        Expr::Implies(Box::new(self), Box::new(other))
    }

    pub fn equiv(self, other: Self) -> Self {
        Expr::Equiv(Box::new(self), Box::new(other))
    }

    pub fn ite(cond: Self, then: Self, else_: Self) -> Self {
        Expr::Ite(Box::new(cond), Box::new(then), Box::new(else_))
    }

    pub fn max(self, other: Self) -> Self {
        Expr::Max(Box::new(self), Box::new(other))
    }

    pub fn min(self, other: Self) -> Self {
        Expr::Min(Box::new(self), Box::new(other))
    }

    pub fn equal(self, other: Self) -> Self {
        Expr::Eq(Box::new(self), Box::new(other))
    }

    pub fn less_than(self, other: Self) -> Self {
        Expr::Lt(Box::new(self), Box::new(other))
    }

    pub fn less_equal(self, other: Self) -> Self {
        Expr::Le(Box::new(self), Box::new(other))
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                out.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Not(a) | Expr::Neg(a) => a.collect_variables(out),
            Expr::Ite(a, b, c) => {
                a.collect_variables(out);
                b.collect_variables(out);
                c.collect_variables(out);
            }
            Expr::And(a, b)
            | Expr::Or(a, b)
            | Expr::Xor(a, b)
            | Expr::Implies(a, b)
            | Expr::Equiv(a, b)
            | Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Max(a, b)
            | Expr::Min(a, b)
            | Expr::Eq(a, b)
            | Expr::Lt(a, b)
            | Expr::Le(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
        }
    }
}

impl Lower for Expr {
    fn lower(&self, mtbdd: &Mtbdd) -> Result<Ref, ExprError> {
        let binary = |a: &Expr, b: &Expr, op: fn(&Mtbdd, Ref, Ref) -> Ref| -> Result<Ref, ExprError> {
            let a = a.lower(mtbdd)?;
            let b = b.lower(mtbdd)?;
            Ok(op(mtbdd, a, b))
        };
        match self {
            Expr::Var(name) => Ok(mtbdd.var(name)?),
            Expr::Const(value) => Ok(mtbdd.constant(value.clone())),
            Expr::Not(a) => Ok(mtbdd.not(a.lower(mtbdd)?)),
            Expr::Neg(a) => Ok(mtbdd.negate(a.lower(mtbdd)?)),
            Expr::Ite(c, t, e) => {
                let c = c.lower(mtbdd)?;
                let t = t.lower(mtbdd)?;
                let e = e.lower(mtbdd)?;
                Ok(mtbdd.ite(c, t, e))
            }
            Expr::And(a, b) => binary(a, b, Mtbdd::and),
            Expr::Or(a, b) => binary(a, b, Mtbdd::or),
            Expr::Xor(a, b) => binary(a, b, Mtbdd::xor),
            Expr::Implies(a, b) => binary(a, b, Mtbdd::implies),
            Expr::Equiv(a, b) => binary(a, b, Mtbdd::equiv),
            Expr::Add(a, b) => binary(a, b, Mtbdd::add),
            Expr::Sub(a, b) => binary(a, b, Mtbdd::subtract),
            Expr::Mul(a, b) => binary(a, b, Mtbdd::multiply),
            Expr::Max(a, b) => binary(a, b, Mtbdd::max),
            Expr::Min(a, b) => binary(a, b, Mtbdd::min),
            Expr::Eq(a, b) => binary(a, b, Mtbdd::equal),
            Expr::Lt(a, b) => binary(a, b, Mtbdd::less_than),
            Expr::Le(a, b) => binary(a, b, Mtbdd::less_equal),
            Expr::Div(..) => Err(ExprError::Unsupported("division".to_string())),
        }
    }

    fn free_variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }
}

macro_rules! expr_binop {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl $trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Self) -> Self::Output {
                Expr::$variant(Box::new(self), Box::new(rhs))
            }
        }
    };
}

expr_binop!(BitAnd, bitand, And);
expr_binop!(BitOr, bitor, Or);
expr_binop!(BitXor, bitxor, Xor);
expr_binop!(Add, add, Add);
expr_binop!(Sub, sub, Sub);
expr_binop!(Mul, mul, Mul);
expr_binop!(Div, div, Div);

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        Expr::Not(Box::new(self))
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::Neg(Box::new(self))
    }
}
