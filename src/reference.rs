use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Handle to a node (decision node or terminal) owned by an [`Mtbdd`][crate::mtbdd::Mtbdd].
///
/// Handles are minted from a monotonically increasing counter and are never
/// reused within the lifetime of a manager, not even after garbage collection.
/// Because every node is hash-consed, two handles are equal iff they denote
/// the same function.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Ref(u32);

impl Ref {
    /// "No node".
    pub const NULL: Ref = Ref(0);
    /// The canonical `false` terminal.
    pub const FALSE: Ref = Ref(1);
    /// The canonical `true` terminal.
    pub const TRUE: Ref = Ref(2);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Return the arena index of the reference.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Reference to one of the two boolean terminals.
    pub const fn from_bool(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "@null")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_refs() {
        assert!(Ref::NULL.is_null());
        assert!(!Ref::FALSE.is_null());
        assert_ne!(Ref::FALSE, Ref::TRUE);
        assert_eq!(Ref::from_bool(true), Ref::TRUE);
        assert_eq!(Ref::from_bool(false), Ref::FALSE);
    }

    #[test]
    fn test_display() {
        assert_eq!(Ref::new(42).to_string(), "@42");
        assert_eq!(Ref::NULL.to_string(), "@null");
    }
}
