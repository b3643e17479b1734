use thiserror::Error;

use crate::reference::Ref;

/// Errors about variable names and orderings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableError {
    #[error("variable `{0}` is not declared")]
    Undeclared(String),

    #[error("invalid variable name `{0}`")]
    InvalidName(String),

    #[error("variable `{0}` appears more than once")]
    Duplicate(String),

    #[error("new order is not a permutation of the declared variables: expected {expected} names, got {got}")]
    NotAPermutation { expected: usize, got: usize },

    #[error("current/next variable lists differ in length: {current} vs {next}")]
    MismatchedVariables { current: usize, next: usize },
}

/// Errors about node handles.
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("node {0} not found")]
    NotFound(Ref),
}

/// Errors while saving or loading snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary encoding error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

/// Errors raised while lowering a front-end expression into a diagram.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Variable(#[from] VariableError),
}

#[derive(Debug, Error)]
pub enum MtbddError {
    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Expr(#[from] ExprError),
}

pub type Result<T, E = MtbddError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            VariableError::Undeclared("x".to_string()).to_string(),
            "variable `x` is not declared"
        );
        assert_eq!(NodeError::NotFound(Ref::new(7)).to_string(), "node @7 not found");
        let err: MtbddError = ExprError::Unsupported("division".to_string()).into();
        assert_eq!(err.to_string(), "unsupported operation: division");
    }

    #[test]
    fn test_expr_wraps_variable() {
        let err: ExprError = VariableError::InvalidName("1x".to_string()).into();
        assert_eq!(err.to_string(), "invalid variable name `1x`");
    }
}
