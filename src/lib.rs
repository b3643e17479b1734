//! # mtbdd-rs: Multi-Terminal Binary Decision Diagrams in Rust
//!
//! **`mtbdd-rs`** is a manager-centric library for **Multi-Terminal Binary Decision Diagrams (MTBDDs)**:
//! canonical DAGs representing functions from boolean assignments to arbitrary terminal values
//! (booleans, integers, floats, strings).
//!
//! ## What is an MTBDD?
//!
//! An MTBDD generalizes a BDD by allowing any value at the leaves. For a fixed variable order,
//! every function has exactly one reduced representation, so two functions are equal iff their
//! handles are equal.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: All operations go through the [`Mtbdd`][crate::mtbdd::Mtbdd] manager,
//!   which owns the node store, the variable order and the operation caches.
//! - **Named variables**: variables are declared by name; their declaration order is the variable order,
//!   which can be changed later with [`set_order`][crate::mtbdd::Mtbdd::set_order].
//! - **One recursive primitive**: every boolean operator is an if-then-else; arithmetic and comparisons
//!   use the same Shannon decomposition with the value algebra applied at the leaves.
//! - **Symbolic model checking**: quantification, image/preimage, least/greatest fixpoints and CTL.
//! - **Thread-safe**: the manager is `Send + Sync`.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mtbdd_rs::mtbdd::Mtbdd;
//! use mtbdd_rs::types::assignment;
//! use mtbdd_rs::value::Value;
//!
//! // 1. Initialize the manager and declare variables
//! let mtbdd = Mtbdd::default();
//! mtbdd.declare(["x", "y"]);
//!
//! // 2. Build a formula: f = x AND (NOT y)
//! let x = mtbdd.var("x").unwrap();
//! let y = mtbdd.var("y").unwrap();
//! let f = mtbdd.and(x, mtbdd.not(y));
//! assert_eq!(mtbdd.count_sat(f), num_bigint::BigUint::from(1u32));
//!
//! // 3. Numeric diagrams: g = 2x + 3y
//! let g = mtbdd.linear_function([("x", 2), ("y", 3)], 0).unwrap();
//! let a = assignment([("x", true), ("y", true)]);
//! assert_eq!(mtbdd.evaluate(g, &a), Value::Int(5));
//! ```
//!
//! ## Core Components
//!
//! - **[`mtbdd`]**: The [`Mtbdd`][crate::mtbdd::Mtbdd] manager, node store accessors and the ITE engine.
//! - **[`apply`]**: Arithmetic and comparison operators.
//! - **[`transform`]** and **[`quant`]**: restrict, compose, rename, image, quantifiers, fixpoints.
//! - **[`ctl`]**: CTL operators over a transition relation.
//! - **[`sat`]**: Satisfiability, enumeration and model counting.
//! - **[`gc`]** and **[`snapshot`]**: Memory lifecycle and persistence.
//! - **[`dot`]**: Utilities for visualizing diagrams using Graphviz.

pub mod algebra;
pub mod apply;
pub mod builders;
pub mod cache;
pub mod config;
pub mod ctl;
pub mod dot;
pub mod error;
pub mod expr;
pub mod gc;
pub mod mtbdd;
pub mod node;
pub mod quant;
pub mod reference;
pub mod registry;
pub mod reorder;
pub mod sat;
pub mod snapshot;
pub mod table;
pub mod transform;
pub mod types;
pub mod value;
