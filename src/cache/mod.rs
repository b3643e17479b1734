//! Typed operation caches.
//!
//! The manager keeps five independent memoization tables, one per operation
//! shape:
//!
//! | Cache     | Key                                       |
//! |-----------|-------------------------------------------|
//! | `ite`     | `(f, g, h)`                               |
//! | `binary`  | `(op, f, g)`                              |
//! | `unary`   | `(op, f)`                                 |
//! | `quant`   | `(quantifier, f, sorted variable set)`    |
//! | `compose` | `(op, f, sorted substitution)`            |
//!
//! They are pure memoization: clearing any of them never changes results,
//! only performance, because identical inputs always canonicalize to
//! identical handles.

mod hashmap;

use std::sync::Arc;

use crate::algebra::{BinaryOp, UnaryOp};
use crate::reference::Ref;

pub use hashmap::HashMapCache;

/// Default cache implementation.
pub type Cache<K, V> = HashMapCache<K, V>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BinaryKey {
    pub op: BinaryOp,
    pub f: Ref,
    pub g: Ref,
}

impl BinaryKey {
    /// Key with operands ordered for commutative operators.
    pub fn new(op: BinaryOp, f: Ref, g: Ref) -> Self {
        if op.is_commutative() && g < f {
            Self { op, f: g, g: f }
        } else {
            Self { op, f, g }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UnaryKey {
    pub op: UnaryOp,
    pub f: Ref,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Quantifier {
    Exists,
    ForAll,
}

/// Sorted, deduplicated variable set.
pub type VarSet = Arc<[Arc<str>]>;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct QuantKey {
    pub quantifier: Quantifier,
    pub f: Ref,
    pub vars: VarSet,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComposeOp {
    Compose,
    Rename,
}

/// Substitution sorted by variable name, one entry per variable.
pub type Substitution = Arc<[(Arc<str>, Ref)]>;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ComposeKey {
    pub op: ComposeOp,
    pub f: Ref,
    pub substitution: Substitution,
}

/// Hit/miss/size counters of one cache.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    fn of<K, V>(cache: &Cache<K, V>) -> Self {
        Self {
            entries: cache.len(),
            hits: cache.hits(),
            misses: cache.misses(),
        }
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct Caches {
    pub ite: Cache<(Ref, Ref, Ref), Ref>,
    pub binary: Cache<BinaryKey, Ref>,
    pub unary: Cache<UnaryKey, Ref>,
    pub quant: Cache<QuantKey, Ref>,
    pub compose: Cache<ComposeKey, Ref>,
}

impl Caches {
    pub fn new(bits: usize) -> Self {
        Self {
            ite: Cache::new(bits),
            binary: Cache::new(bits),
            unary: Cache::new(bits),
            quant: Cache::new(bits),
            compose: Cache::new(bits),
        }
    }

    /// Reset all five caches.
    pub fn clear(&mut self) {
        self.ite.clear();
        self.binary.clear();
        self.unary.clear();
        self.quant.clear();
        self.compose.clear();
    }

    /// Per-cache statistics, labelled.
    pub fn stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            ("ite", CacheStats::of(&self.ite)),
            ("binary", CacheStats::of(&self.binary)),
            ("unary", CacheStats::of(&self.unary)),
            ("quant", CacheStats::of(&self.quant)),
            ("compose", CacheStats::of(&self.compose)),
        ]
    }
}
