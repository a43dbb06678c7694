//! The Call Return Forest (CRF) of a CNP parse.
//!
//! A bipartite directed graph: cluster nodes `(X, j)` record that nonterminal `X` was entered at
//! input position `j`; label nodes `(slot, j)` record a caller waiting at a dotted position.
//! The graph is cyclic by nature, so nodes are interned into two tables and edges are plain
//! integer indices; every lifetime coincides with the parser context that owns the forest.

use crate::parser::Slot;
use crate::{Grammar, SymbolIdx};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A cluster node `(X, j)`: nonterminal `X` entered at input position `j`.
pub struct ClusterNode {
    pub head: SymbolIdx,
    pub j: usize,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A label node `(slot, j)`: a caller paused at `slot` in a parse started at position `j`.
pub struct LabelNode {
    pub slot: Slot,
    pub j: usize,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClusterIdx(usize);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LabelIdx(usize);

#[derive(Default)]
/// The interned node tables plus the cluster-to-label adjacency.
pub struct Crf {
    cluster_nodes: Vec<ClusterNode>,
    cluster_index: HashMap<ClusterNode, ClusterIdx>,
    label_nodes: Vec<LabelNode>,
    label_index: HashMap<LabelNode, LabelIdx>,
    children: Vec<Vec<LabelIdx>>,
    edges: HashSet<(ClusterIdx, LabelIdx)>,
}

impl Crf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a cluster node; returns its index and whether it was newly created.
    pub fn add_cluster_node(&mut self, node: ClusterNode) -> (ClusterIdx, bool) {
        if let Some(&idx) = self.cluster_index.get(&node) {
            return (idx, false);
        }
        let idx = ClusterIdx(self.cluster_nodes.len());
        self.cluster_nodes.push(node);
        self.cluster_index.insert(node, idx);
        self.children.push(Vec::new());
        (idx, true)
    }

    /// Intern a label node; returns its index and whether it was newly created.
    pub fn add_label_node(&mut self, node: LabelNode) -> (LabelIdx, bool) {
        if let Some(&idx) = self.label_index.get(&node) {
            return (idx, false);
        }
        let idx = LabelIdx(self.label_nodes.len());
        self.label_nodes.push(node);
        self.label_index.insert(node, idx);
        (idx, true)
    }

    /// Add an edge from a cluster node to a caller label node. Returns whether the edge is new;
    /// duplicates are suppressed and child order is insertion order.
    pub fn add_edge(&mut self, parent: ClusterIdx, child: LabelIdx) -> bool {
        if !self.edges.insert((parent, child)) {
            return false;
        }
        self.children[parent.0].push(child);
        true
    }

    pub fn cluster_idx(&self, node: &ClusterNode) -> Option<ClusterIdx> {
        self.cluster_index.get(node).copied()
    }

    pub fn cluster_node(&self, idx: ClusterIdx) -> ClusterNode {
        self.cluster_nodes[idx.0]
    }

    pub fn label_node(&self, idx: LabelIdx) -> LabelNode {
        self.label_nodes[idx.0]
    }

    /// The caller label nodes of a cluster, in insertion order.
    pub fn children(&self, parent: ClusterIdx) -> &[LabelIdx] {
        &self.children[parent.0]
    }

    pub fn cluster_nodes(&self) -> &[ClusterNode] {
        &self.cluster_nodes
    }

    pub fn label_nodes(&self) -> &[LabelNode] {
        &self.label_nodes
    }

    /// Write the forest, one cluster node and its callers per line.
    pub fn write(&self, grammar: &Grammar, w: &mut dyn Write) -> std::fmt::Result {
        for (i, node) in self.cluster_nodes.iter().enumerate() {
            write!(
                w,
                "({}, {}) -> [",
                grammar.symbols().get(node.head),
                node.j
            )?;
            for (n, &child) in self.children[i].iter().enumerate() {
                if n != 0 {
                    write!(w, ", ")?;
                }
                let label = self.label_nodes[child.0];
                write!(w, "(")?;
                grammar.write_slot(w, label.slot)?;
                write!(w, ", {})", label.j)?;
            }
            writeln!(w, "]")?;
        }
        Ok(())
    }
}
