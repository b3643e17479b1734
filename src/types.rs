//! Small shared types: levels in the variable ordering and assignments.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A level in the variable ordering (0-indexed).
///
/// Levels represent the position of a variable in the current ordering.
/// Unlike variable names, levels change when variables are reordered.
///
/// # Invariants
///
/// - Level 0 is the topmost level (closest to root)
/// - Levels increase downward toward terminals
/// - After reordering, the same variable may be at a different level
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// Creates a new level with the given index.
    pub fn new(index: u32) -> Self {
        Level(index)
    }

    /// Returns the raw level index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw level index.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns the next level down (index + 1).
    pub fn next(self) -> Self {
        Level(self.0 + 1)
    }

    /// Returns the previous level up (index - 1), or None if at level 0.
    pub fn prev(self) -> Option<Self> {
        if self.0 > 0 {
            Some(Level(self.0 - 1))
        } else {
            None
        }
    }

    /// Checks if this is the top level (level 0).
    pub fn is_top(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl From<Level> for usize {
    fn from(level: Level) -> Self {
        level.index()
    }
}

impl From<u32> for Level {
    fn from(index: u32) -> Self {
        Level(index)
    }
}

/// A (partial) assignment of boolean values to variables, keyed by name.
///
/// Ordered map so that enumerations and debug output are deterministic.
pub type Assignment = BTreeMap<String, bool>;

/// Builds an [`Assignment`] from `(name, value)` pairs.
pub fn assignment<S: Into<String>>(pairs: impl IntoIterator<Item = (S, bool)>) -> Assignment {
    pairs.into_iter().map(|(name, value)| (name.into(), value)).collect()
}
