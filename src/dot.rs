//! MTBDD to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Terminals** are boxes at the bottom (sink rank), labelled with their value
//! - **Decision nodes** are labelled with their variable, one rank per level
//! - **Edges**: solid lines are high (then) edges, dashed lines low (else) edges
//! - **Roots** are rendered as plain text at the top (source rank)
//!
//! # Examples
//!
//! ```
//! use mtbdd_rs::mtbdd::Mtbdd;
//!
//! let mtbdd = Mtbdd::new();
//! mtbdd.declare(["x", "y"]);
//! let f = mtbdd.linear_function([("x", 2), ("y", 3)], 0).unwrap();
//!
//! let dot = mtbdd.to_dot(&[f]).unwrap();
//! assert!(dot.contains("label=\"5\""));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::gc::reachable;
use crate::mtbdd::Mtbdd;
use crate::node::Node;
use crate::reference::Ref;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for decision nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for terminals (default: "box")
    pub terminal_shape: &'static str,
    /// Shape for root labels (default: "plaintext")
    pub root_shape: &'static str,
    /// Style for high (then) edges (default: "solid")
    pub high_edge_style: &'static str,
    /// Style for low (else) edges (default: "dashed")
    pub low_edge_style: &'static str,
    /// Show node handles next to variable names (default: false)
    pub show_handles: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            terminal_shape: "box",
            root_shape: "plaintext",
            high_edge_style: "solid",
            low_edge_style: "dashed",
            show_handles: false,
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Mtbdd {
    /// Render every node reachable from `roots` as a DOT digraph.
    pub fn to_dot(&self, roots: &[Ref]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, roots: &[Ref], config: &DotConfig) -> Result<String, std::fmt::Error> {
        let state = self.read();
        let all_nodes = reachable(&state.table, roots);
        let mut ordered: Vec<Ref> = all_nodes.into_iter().collect();
        ordered.sort();

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        let mut levels = BTreeMap::<u32, Vec<(Ref, &str)>>::new();
        let mut terminals = Vec::new();
        for &id in &ordered {
            match state.table.get(id) {
                Some(Node::Decision(d)) => levels.entry(d.level.get()).or_default().push((id, &*d.variable)),
                Some(Node::Terminal(value)) => terminals.push((id, value.to_string())),
                None => {}
            }
        }

        writeln!(dot, "{{ rank=sink")?;
        for (id, label) in &terminals {
            writeln!(
                dot,
                "n{} [shape={}, label=\"{}\"];",
                id.get(),
                config.terminal_shape,
                escape(label)
            )?;
        }
        writeln!(dot, "}}")?;

        for nodes in levels.values() {
            writeln!(dot, "{{ rank=same")?;
            for &(id, variable) in nodes {
                let label = if config.show_handles {
                    format!("{} {}", variable, id)
                } else {
                    variable.to_string()
                };
                writeln!(dot, "n{} [label=\"{}\"];", id.get(), escape(&label))?;
            }
            writeln!(dot, "}}")?;
        }

        for &id in &ordered {
            if let Some(Node::Decision(d)) = state.table.get(id) {
                writeln!(dot, "n{} -> n{} [style={}];", id.get(), d.high.get(), config.high_edge_style)?;
                writeln!(dot, "n{} -> n{} [style={}];", id.get(), d.low.get(), config.low_edge_style)?;
            }
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, root)?;
        }
        writeln!(dot, "}}")?;
        for (i, root) in roots.iter().enumerate() {
            if state.table.contains(*root) {
                writeln!(dot, "r{} -> n{};", i, root.get())?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::mtbdd::tests::setup;

    #[test]
    fn test_to_dot_basic() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let f = mtbdd.and(v[0], v[1]);
        let dot = mtbdd.to_dot(&[f]).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("label=\"x\""));
        assert!(dot.contains("label=\"y\""));
        assert!(dot.contains("label=\"false\""));
        assert!(dot.contains(&format!("r0 -> n{};", f.get())));
    }

    #[test]
    fn test_to_dot_terminals() {
        let (mtbdd, v) = setup(&["x"]);
        let f = mtbdd.ite(v[0], mtbdd.constant("a\"b"), mtbdd.constant(1.5));
        let dot = mtbdd.to_dot(&[f]).unwrap();
        assert!(dot.contains("label=\"1.5\""));
        // Value renders as "a\"b", which is escaped once more for DOT.
        assert!(dot.contains(r#"label="\"a\\\"b\"""#));
    }

    #[test]
    fn test_to_dot_shared_roots() {
        let (mtbdd, v) = setup(&["x", "y"]);
        let and = mtbdd.and(v[0], v[1]);
        let or = mtbdd.or(v[0], v[1]);
        let dot = mtbdd.to_dot(&[and, or, Ref::TRUE]).unwrap();
        // y appears once even though both roots use it
        assert_eq!(dot.matches(&format!("n{} [label=\"y\"]", v[1].get())).count(), 1);
        assert!(dot.contains("r2 -> n2;"));
    }

    #[test]
    fn test_to_dot_with_config() {
        let (mtbdd, v) = setup(&["x"]);
        let config = DotConfig {
            show_handles: true,
            ..DotConfig::default()
        };
        let dot = mtbdd.to_dot_with_config(&[v[0]], &config).unwrap();
        assert!(dot.contains(&format!("label=\"x {}\"", v[0])));
    }
}
