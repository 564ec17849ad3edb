//! Labeled directed multigraph
//!
//! Edges are stored in parallel arrays indexed by arrival order. Every node
//! keeps an outbound and an inbound list of edge ids so that its full
//! neighborhood, split by direction, is enumerated in O(degree).
//!
//! An undirected graph is stored directionally: each logical edge becomes two
//! directed edges sharing the same label.

use std::collections::BTreeSet;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node identifier, always in `[0, num_nodes)`
pub type Node = usize;

/// Edge identifier: position in edge-arrival order
pub type EdgeId = usize;

/// Node label, edge label or color
pub type Label = u64;

/// Errors that can occur while building a graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {node} out of range (graph has {num_nodes} nodes)")]
    NodeOutOfRange { node: Node, num_nodes: usize },

    #[error("Length mismatch: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A directed, labeled edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub src: Node,
    pub dst: Node,
    pub label: Label,
}

/// Directed multigraph with per-edge labels and per-node labels.
///
/// Invariants:
/// - `outbound[v]` lists exactly the edges whose source is `v`
/// - `inbound[v]` lists exactly the edges whose destination is `v`
/// - both lists are in insertion order
/// - `edge_label_set` holds every label used by some edge
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabeledGraph {
    /// Outbound edge ids per node
    outbound: Vec<Vec<EdgeId>>,
    /// Inbound edge ids per node
    inbound: Vec<Vec<EdgeId>>,

    edges_src: Vec<Node>,
    edges_dst: Vec<Node>,
    edge_labels: Vec<Label>,
    edge_label_set: BTreeSet<Label>,

    node_labels: Vec<Label>,
    node_label_set: BTreeSet<Label>,

    directed: bool,
}

impl LabeledGraph {
    /// Create an empty graph
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Default::default()
        }
    }

    /// Create a graph with `num_nodes` isolated nodes carrying `node_labels`
    pub fn with_nodes(num_nodes: usize, node_labels: Vec<Label>, directed: bool) -> GraphResult<Self> {
        if node_labels.len() != num_nodes {
            return Err(GraphError::LengthMismatch {
                what: "node_labels",
                expected: num_nodes,
                actual: node_labels.len(),
            });
        }

        Ok(Self {
            outbound: vec![Vec::new(); num_nodes],
            inbound: vec![Vec::new(); num_nodes],
            node_label_set: node_labels.iter().copied().collect(),
            node_labels,
            directed,
            ..Default::default()
        })
    }

    /// Create a graph from parallel source/destination/label arrays.
    ///
    /// Edge `i` of the input becomes edge `i` of a directed graph; an
    /// undirected graph gets edges `2i` and `2i + 1`.
    pub fn from_edges(
        num_nodes: usize,
        edges_src: &[Node],
        edges_dst: &[Node],
        edge_labels: &[Label],
        node_labels: Vec<Label>,
        directed: bool,
    ) -> GraphResult<Self> {
        if edges_dst.len() != edges_src.len() {
            return Err(GraphError::LengthMismatch {
                what: "edges_dst",
                expected: edges_src.len(),
                actual: edges_dst.len(),
            });
        }
        if edge_labels.len() != edges_src.len() {
            return Err(GraphError::LengthMismatch {
                what: "edge_labels",
                expected: edges_src.len(),
                actual: edge_labels.len(),
            });
        }

        let mut graph = Self::with_nodes(num_nodes, node_labels, directed)?;
        for ((&src, &dst), &label) in edges_src.iter().zip(edges_dst).zip(edge_labels) {
            graph.add_edge(src, dst, label)?;
        }
        Ok(graph)
    }

    /// Create a graph from `(src, dst)` pairs, every edge labeled `0`
    pub fn from_edge_list(
        num_nodes: usize,
        edge_list: &[(Node, Node)],
        node_labels: Vec<Label>,
        directed: bool,
    ) -> GraphResult<Self> {
        let mut graph = Self::with_nodes(num_nodes, node_labels, directed)?;
        for &(src, dst) in edge_list {
            graph.add_edge(src, dst, 0)?;
        }
        Ok(graph)
    }

    /// Append an isolated node labeled `0`
    pub fn add_node(&mut self) -> Node {
        self.add_node_with_label(0)
    }

    /// Append an isolated node with the given label
    pub fn add_node_with_label(&mut self, label: Label) -> Node {
        self.outbound.push(Vec::new());
        self.inbound.push(Vec::new());
        self.node_labels.push(label);
        self.node_label_set.insert(label);
        self.outbound.len() - 1
    }

    /// Add the edge `src -> dst` (and `dst -> src` when undirected).
    ///
    /// Returns the id of the first inserted edge. Fails without touching the
    /// graph when either endpoint is out of range.
    pub fn add_edge(&mut self, src: Node, dst: Node, label: Label) -> GraphResult<EdgeId> {
        self.check_node(src)?;
        self.check_node(dst)?;

        let id = self.push_edge(src, dst, label);
        if !self.directed {
            self.push_edge(dst, src, label);
        }
        self.edge_label_set.insert(label);
        Ok(id)
    }

    fn push_edge(&mut self, src: Node, dst: Node, label: Label) -> EdgeId {
        let id = self.edges_src.len();
        self.outbound[src].push(id);
        self.inbound[dst].push(id);
        self.edges_src.push(src);
        self.edges_dst.push(dst);
        self.edge_labels.push(label);
        id
    }

    fn check_node(&self, node: Node) -> GraphResult<()> {
        if node >= self.num_nodes() {
            return Err(GraphError::NodeOutOfRange {
                node,
                num_nodes: self.num_nodes(),
            });
        }
        Ok(())
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.outbound.len()
    }

    /// Number of directed edges (mirrored edges of an undirected graph count)
    pub fn num_edges(&self) -> usize {
        self.edges_src.len()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Source of edge `e`
    pub fn src(&self, e: EdgeId) -> Node {
        self.edges_src[e]
    }

    /// Destination of edge `e`
    pub fn dst(&self, e: EdgeId) -> Node {
        self.edges_dst[e]
    }

    /// Edge record for `e`
    pub fn edge(&self, e: EdgeId) -> Edge {
        Edge {
            src: self.edges_src[e],
            dst: self.edges_dst[e],
            label: self.edge_labels[e],
        }
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.num_edges()).map(move |e| self.edge(e))
    }

    /// Edges leaving `v`, in insertion order
    pub fn outbound_edges(&self, v: Node) -> &[EdgeId] {
        &self.outbound[v]
    }

    /// Edges entering `v`, in insertion order
    pub fn inbound_edges(&self, v: Node) -> &[EdgeId] {
        &self.inbound[v]
    }

    /// Outbound edges of `v` followed by its inbound edges
    pub fn incident_edges(&self, v: Node) -> Vec<EdgeId> {
        let mut incident = Vec::with_capacity(self.outbound[v].len() + self.inbound[v].len());
        incident.extend_from_slice(&self.outbound[v]);
        incident.extend_from_slice(&self.inbound[v]);
        incident
    }

    pub fn out_degree(&self, v: Node) -> usize {
        self.outbound[v].len()
    }

    pub fn in_degree(&self, v: Node) -> usize {
        self.inbound[v].len()
    }

    /// Degree of `v`. In an undirected graph every logical edge appears once
    /// in each direction, so only the outbound side is counted.
    pub fn degree(&self, v: Node) -> usize {
        if self.directed {
            self.out_degree(v) + self.in_degree(v)
        } else {
            self.out_degree(v)
        }
    }

    /// Node labels, one per node
    pub fn node_labels(&self) -> &[Label] {
        &self.node_labels
    }

    /// Distinct node labels
    pub fn node_label_set(&self) -> &BTreeSet<Label> {
        &self.node_label_set
    }

    /// Edge labels, aligned with edge ids
    pub fn edge_labels(&self) -> &[Label] {
        &self.edge_labels
    }

    /// Distinct edge labels
    pub fn edge_label_set(&self) -> &BTreeSet<Label> {
        &self.edge_label_set
    }

    /// Whether some edge `v -> w` exists. Linear in the out-degree of `v`.
    pub fn has_edge(&self, v: Node, w: Node) -> bool {
        self.outbound[v].iter().any(|&e| self.edges_dst[e] == w)
    }
}
