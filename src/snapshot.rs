//! Snapshots: the full node store and variable registry, independent of the
//! operation caches.
//!
//! Three encodings are supported:
//!
//! - [`SnapshotFormat::Binary`]: `b"MTBD"`, a format version byte, the payload
//!   length as a little-endian `u64`, then the bincode payload;
//! - [`SnapshotFormat::Gzip`]: the binary encoding, gzip-compressed;
//! - [`SnapshotFormat::Json`]: indented JSON.
//!
//! Handles are stored verbatim, so a restored engine keeps the numbering of
//! the saved one. Loading validates the snapshot completely before touching
//! the engine.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::cache::Caches;
use crate::error::SnapshotError;
use crate::mtbdd::{Mtbdd, State};
use crate::node::{DecisionNode, Node};
use crate::reference::Ref;
use crate::registry::{is_valid_name, VarRegistry};
use crate::table::NodeTable;
use crate::types::Level;
use crate::value::Value;

const MAGIC: &[u8; 4] = b"MTBD";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = 4 + 1 + 8;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SnapshotFormat {
    Binary,
    Gzip,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: Ref,
    pub variable: String,
    pub level: u32,
    pub low: Ref,
    pub high: Ref,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTerminal {
    pub id: Ref,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    pub level: u32,
    pub variable: String,
    pub low: Ref,
    pub high: Ref,
    pub node: Ref,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub next_handle: u32,
    /// Variables in level order.
    pub variables: Vec<String>,
    pub levels: BTreeMap<String, u32>,
    pub terminals: Vec<SnapshotTerminal>,
    pub nodes: Vec<SnapshotNode>,
    pub canonical: Vec<CanonicalEntry>,
}

fn corrupt(msg: impl Into<String>) -> SnapshotError {
    SnapshotError::Corrupt(msg.into())
}

impl Snapshot {
    fn capture(state: &State) -> Self {
        let mut terminals = Vec::new();
        let mut nodes = Vec::new();
        for (id, node) in state.table.iter() {
            match node {
                Node::Terminal(value) => terminals.push(SnapshotTerminal {
                    id,
                    value: value.clone(),
                }),
                Node::Decision(d) => nodes.push(SnapshotNode {
                    id,
                    variable: d.variable.to_string(),
                    level: d.level.get(),
                    low: d.low,
                    high: d.high,
                }),
            }
        }
        let mut canonical: Vec<CanonicalEntry> = state
            .table
            .unique_entries()
            .map(|((level, variable, low, high), node)| CanonicalEntry {
                level: level.get(),
                variable: variable.to_string(),
                low: *low,
                high: *high,
                node,
            })
            .collect();
        canonical.sort_by_key(|e| e.node);

        let variables: Vec<String> = state.registry.names().iter().map(|n| n.to_string()).collect();
        let levels = variables
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i as u32))
            .collect();

        Snapshot {
            next_handle: state.table.next_handle(),
            variables,
            levels,
            terminals,
            nodes,
            canonical,
        }
    }

    /// Check every structural invariant and rebuild the store.
    fn into_parts(self) -> Result<(NodeTable, VarRegistry), SnapshotError> {
        let registry = VarRegistry::from_order(&self.variables).map_err(|e| corrupt(e.to_string()))?;
        if self.levels.len() != registry.len() {
            return Err(corrupt("level map does not match the variable list"));
        }
        for (name, &level) in &self.levels {
            if registry.level(name) != Some(Level::new(level)) {
                return Err(corrupt(format!("level of `{}` does not match the variable list", name)));
            }
        }

        let mut ids = FxHashSet::default();
        let mut check_id = |id: Ref| -> Result<(), SnapshotError> {
            if id.is_null() || id.get() >= self.next_handle {
                return Err(corrupt(format!("handle {} out of range", id)));
            }
            if !ids.insert(id) {
                return Err(corrupt(format!("handle {} used twice", id)));
            }
            Ok(())
        };

        let mut entries: Vec<(Ref, Node)> = Vec::with_capacity(self.terminals.len() + self.nodes.len());
        let mut node_levels: FxHashMap<Ref, Option<Level>> = FxHashMap::default();

        let mut values = FxHashSet::default();
        for t in self.terminals {
            check_id(t.id)?;
            if !values.insert(t.value.clone()) {
                return Err(corrupt(format!("terminal {} stored twice", t.value)));
            }
            node_levels.insert(t.id, None);
            entries.push((t.id, Node::Terminal(t.value)));
        }
        for (id, expected) in [(Ref::FALSE, false), (Ref::TRUE, true)] {
            let ok = entries
                .iter()
                .any(|(r, n)| *r == id && n.as_terminal() == Some(&Value::Bool(expected)));
            if !ok {
                return Err(corrupt(format!("boolean terminal {} missing", id)));
            }
        }

        for n in &self.nodes {
            check_id(n.id)?;
            node_levels.insert(n.id, Some(Level::new(n.level)));
        }

        // Nodes relabelled to an undeclared name sit at an existing level.
        let mut undeclared: FxHashMap<String, Arc<str>> = FxHashMap::default();
        let mut keys = FxHashMap::default();
        for n in self.nodes {
            let (variable, level) = match registry.resolve(&n.variable) {
                Ok((variable, level)) => {
                    if level.get() != n.level {
                        return Err(corrupt(format!("node {} has a stale level for `{}`", n.id, n.variable)));
                    }
                    (variable, level)
                }
                Err(_) if is_valid_name(&n.variable) && (n.level as usize) < registry.len() => {
                    let variable = undeclared
                        .entry(n.variable.clone())
                        .or_insert_with(|| Arc::from(n.variable.as_str()));
                    (Arc::clone(variable), Level::new(n.level))
                }
                Err(e) => return Err(corrupt(format!("node {}: {}", n.id, e))),
            };
            if n.low == n.high {
                return Err(corrupt(format!("node {} is redundant", n.id)));
            }
            for child in [n.low, n.high] {
                match node_levels.get(&child) {
                    None => return Err(corrupt(format!("node {} points to missing {}", n.id, child))),
                    Some(Some(l)) if *l <= level => {
                        return Err(corrupt(format!("node {} violates the variable order", n.id)));
                    }
                    _ => {}
                }
            }
            if keys.insert((level, Arc::clone(&variable), n.low, n.high), n.id).is_some() {
                return Err(corrupt(format!("node {} duplicates another node", n.id)));
            }
            entries.push((
                n.id,
                Node::Decision(DecisionNode {
                    variable,
                    level,
                    low: n.low,
                    high: n.high,
                }),
            ));
        }

        if self.canonical.len() != keys.len() {
            return Err(corrupt("canonical table does not match the nodes"));
        }
        for e in &self.canonical {
            let key = (Level::new(e.level), Arc::from(e.variable.as_str()), e.low, e.high);
            if keys.get(&key) != Some(&e.node) {
                return Err(corrupt(format!("canonical entry for {} does not match", e.node)));
            }
        }

        Ok((NodeTable::from_entries(entries, self.next_handle), registry))
    }

    /// Encode in the given format.
    pub fn encode(&self, format: SnapshotFormat) -> Result<Vec<u8>, SnapshotError> {
        match format {
            SnapshotFormat::Binary => {
                let payload = bincode::serialize(self)?;
                let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
                bytes.extend_from_slice(MAGIC);
                bytes.push(FORMAT_VERSION);
                bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
                bytes.extend_from_slice(&payload);
                Ok(bytes)
            }
            SnapshotFormat::Gzip => {
                let binary = self.encode(SnapshotFormat::Binary)?;
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&binary)?;
                Ok(encoder.finish()?)
            }
            SnapshotFormat::Json => Ok(serde_json::to_vec_pretty(self)?),
        }
    }

    /// Decode from the given format.
    pub fn decode(bytes: &[u8], format: SnapshotFormat) -> Result<Self, SnapshotError> {
        match format {
            SnapshotFormat::Binary => {
                if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
                    return Err(corrupt("not a binary snapshot"));
                }
                if bytes[4] != FORMAT_VERSION {
                    return Err(corrupt(format!("unsupported format version {}", bytes[4])));
                }
                let mut len = [0u8; 8];
                len.copy_from_slice(&bytes[5..HEADER_LEN]);
                let len = u64::from_le_bytes(len);
                let payload = &bytes[HEADER_LEN..];
                if payload.len() as u64 != len {
                    return Err(corrupt(format!("expected {} payload bytes, found {}", len, payload.len())));
                }
                Ok(bincode::deserialize(payload)?)
            }
            SnapshotFormat::Gzip => {
                let mut binary = Vec::new();
                GzDecoder::new(bytes).read_to_end(&mut binary)?;
                Self::decode(&binary, SnapshotFormat::Binary)
            }
            SnapshotFormat::Json => Ok(serde_json::from_slice(bytes)?),
        }
    }
}

impl Mtbdd {
    /// Capture the node store and variable registry.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.read())
    }

    /// Replace the whole engine state by `snapshot`. Caches start empty.
    ///
    /// On error the engine is left untouched.
    pub fn restore(&self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        let (table, registry) = snapshot.into_parts()?;
        let mut state = self.write();
        info!(
            "restoring snapshot: {} nodes, {} variables",
            table.len(),
            registry.len()
        );
        *state = State {
            table,
            registry,
            caches: Caches::new(self.config().cache_capacity_bits),
        };
        Ok(())
    }

    /// Build a fresh engine from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Mtbdd, SnapshotError> {
        let mtbdd = Mtbdd::new();
        mtbdd.restore(snapshot)?;
        Ok(mtbdd)
    }

    pub fn to_bytes(&self, format: SnapshotFormat) -> Result<Vec<u8>, SnapshotError> {
        self.snapshot().encode(format)
    }

    pub fn from_bytes(bytes: &[u8], format: SnapshotFormat) -> Result<Mtbdd, SnapshotError> {
        Mtbdd::from_snapshot(Snapshot::decode(bytes, format)?)
    }

    /// Write a snapshot to `path`.
    pub fn save(&self, path: impl AsRef<Path>, format: SnapshotFormat) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let bytes = self.to_bytes(format)?;
        fs::write(path, &bytes)?;
        info!("saved {:?} snapshot to {} ({} bytes)", format, path.display(), bytes.len());
        Ok(())
    }

    /// Replace the engine state by the snapshot stored at `path`.
    pub fn load(&self, path: impl AsRef<Path>, format: SnapshotFormat) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        info!("loading {:?} snapshot from {} ({} bytes)", format, path.display(), bytes.len());
        self.restore(Snapshot::decode(&bytes, format)?)
    }
}
