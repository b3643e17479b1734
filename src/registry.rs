//! Variable registry: declared names and their levels.
//!
//! Levels are handed out in declaration order starting at 0. The only way to
//! change them afterwards is an explicit reorder, which the manager performs
//! as a sequence of adjacent [`VarRegistry::swap`]s.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::VariableError;
use crate::types::Level;

/// Whether `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Default)]
pub struct VarRegistry {
    /// Level → name.
    order: Vec<Arc<str>>,
    /// Name → level.
    levels: FxHashMap<Arc<str>, Level>,
}

impl VarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from a level-ordered list of names.
    pub fn from_order<S: AsRef<str>>(names: &[S]) -> Result<Self, VariableError> {
        let mut registry = Self::new();
        for name in names {
            let name = name.as_ref();
            if !is_valid_name(name) {
                return Err(VariableError::InvalidName(name.to_string()));
            }
            if registry.contains(name) {
                return Err(VariableError::Duplicate(name.to_string()));
            }
            registry.push(name);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    /// Names in level order.
    pub fn names(&self) -> &[Arc<str>] {
        &self.order
    }

    pub fn level(&self, name: &str) -> Option<Level> {
        self.levels.get(name).copied()
    }

    pub fn name(&self, level: Level) -> Option<&Arc<str>> {
        self.order.get(level.index())
    }

    /// Interned name and level of a declared variable.
    pub fn resolve(&self, name: &str) -> Result<(Arc<str>, Level), VariableError> {
        match self.levels.get_key_value(name) {
            Some((interned, &level)) => Ok((Arc::clone(interned), level)),
            None => Err(VariableError::Undeclared(name.to_string())),
        }
    }

    fn push(&mut self, name: &str) -> Level {
        let level = Level::new(self.order.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.order.push(Arc::clone(&name));
        self.levels.insert(name, level);
        level
    }

    /// Declare a single variable, returning its level.
    ///
    /// Already declared names keep their level.
    pub fn declare(&mut self, name: &str) -> Result<Level, VariableError> {
        if let Some(level) = self.level(name) {
            return Ok(level);
        }
        if !is_valid_name(name) {
            return Err(VariableError::InvalidName(name.to_string()));
        }
        Ok(self.push(name))
    }

    /// Check that `new_order` is a permutation of exactly the declared names.
    pub fn check_permutation<S: AsRef<str>>(&self, new_order: &[S]) -> Result<(), VariableError> {
        if new_order.len() != self.len() {
            return Err(VariableError::NotAPermutation {
                expected: self.len(),
                got: new_order.len(),
            });
        }
        let mut seen = FxHashSet::default();
        for name in new_order {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(VariableError::Undeclared(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(VariableError::Duplicate(name.to_string()));
            }
        }
        Ok(())
    }

    /// Exchange the variables at `level` and `level + 1`.
    pub fn swap(&mut self, level: Level) {
        let i = level.index();
        assert!(i + 1 < self.order.len(), "cannot swap {} with the level below it", level);
        self.order.swap(i, i + 1);
        self.levels.insert(Arc::clone(&self.order[i]), Level::new(i as u32));
        self.levels.insert(Arc::clone(&self.order[i + 1]), Level::new(i as u32 + 1));
    }
}
