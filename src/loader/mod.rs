//! Graph loader for `.lp` fact files
//!
//! Reads the ground facts describing a labeled graph:
//! - `node(X)` declares a node; nodes are numbered in declaration order
//! - `labelname(I, Name)` declares edge label index `I`
//! - `edge((X, Y))` declares a directed edge
//! - `tlabel((X, Y), I)` labels an edge
//! - `chosen(I)` selects an edge label
//! - `color(X, C)` gives node `X` the initial color `C`
//!
//! Lines with other predicates, comments and solver chatter are skipped.

pub mod parser;

use crate::loader::parser::{Fact, Rule, Term};
use amenability_refinement::{GraphError, Label, LabeledGraph, Node};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const PREDICATES: &[&str] = &["node", "labelname", "edge", "tlabel", "chosen", "color"];

/// Loader errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file extension for '{}' (expected .lp)", .0.display())]
    UnsupportedExtension(PathBuf),

    #[error("Syntax error on line {line}: {source}")]
    Syntax {
        line: usize,
        source: pest::error::Error<Rule>,
    },

    #[error("Line {line}: {predicate}/{found} found, expected {predicate}/{expected}")]
    Arity {
        line: usize,
        predicate: String,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: expected an integer, found '{text}'")]
    InvalidInteger { line: usize, text: String },

    #[error("Line {line}: expected a pair (X, Y), found '{text}'")]
    ExpectedPair { line: usize, text: String },

    #[error("Node '{0}' declared twice")]
    DuplicateNode(String),

    #[error("Label index {0} declared twice")]
    DuplicateLabel(i64),

    #[error("Edge ({0}, {1}) declared twice")]
    DuplicateEdge(String, String),

    #[error("Unknown node '{0}'")]
    UnknownNode(String),

    #[error("Unknown label index {0}")]
    UnknownLabel(i64),

    #[error("Edge ({src}, {dst}) has {found} labels, expected exactly one")]
    EdgeLabelArity {
        src: String,
        dst: String,
        found: usize,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Loader configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Ignore `color` facts; every node starts with color 1
    pub uniform_initial_coloring: bool,
    /// Keep only edges whose label is selected by a `chosen` fact
    pub use_chosen_labels: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            uniform_initial_coloring: false,
            use_chosen_labels: true,
        }
    }
}

/// A graph read from a fact file, with the names needed to report on it
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    /// Where the facts came from
    pub source: String,
    /// Directed graph; node labels are the initial colors
    pub graph: LabeledGraph,
    /// Node name by node id
    pub node_names: Vec<String>,
    /// Label name by graph edge label
    pub label_names: Vec<String>,
    /// Number of `edge` facts, before chosen-label filtering
    pub declared_edges: usize,
}

impl LoadedGraph {
    pub fn node_name(&self, v: Node) -> &str {
        &self.node_names[v]
    }

    /// Initial node colors
    pub fn node_labels(&self) -> &[Label] {
        self.graph.node_labels()
    }
}

/// Load a `.lp` file
pub fn load_path(path: impl AsRef<Path>, config: &LoaderConfig) -> LoadResult<LoadedGraph> {
    let path = path.as_ref();
    if path.extension().and_then(|ext| ext.to_str()) != Some("lp") {
        return Err(LoadError::UnsupportedExtension(path.to_path_buf()));
    }

    info!("Reading file '{}'", path.display());
    let text = fs::read_to_string(path)?;
    parse_facts(&text, &path.display().to_string(), config)
}

/// Load facts from memory
pub fn parse_str(text: &str, config: &LoaderConfig) -> LoadResult<LoadedGraph> {
    parse_facts(text, "<memory>", config)
}

fn parse_facts(text: &str, source: &str, config: &LoaderConfig) -> LoadResult<LoadedGraph> {
    let mut tables = FactTables::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        match parser::parse_line(trimmed) {
            Ok(facts) => {
                for fact in facts {
                    tables.apply(fact, line)?;
                }
            }
            Err(source) if is_graph_line(trimmed) => return Err(LoadError::Syntax { line, source }),
            Err(_) => debug!("Skipping line {}: {}", line, trimmed),
        }
    }

    tables.build(source, config)
}

/// Whether a line starts with one of the graph predicates
fn is_graph_line(line: &str) -> bool {
    PREDICATES.iter().any(|p| {
        line.strip_prefix(p)
            .is_some_and(|rest| rest.trim_start().starts_with('('))
    })
}

/// Facts collected from the input, keyed the way they are cross-referenced
#[derive(Default)]
struct FactTables {
    /// Node name -> id, in declaration order
    nodes: IndexMap<String, Node>,
    /// Label index -> name, ordered by index
    labels: BTreeMap<i64, String>,
    /// Declared edges, in declaration order
    edges: IndexMap<(String, String), usize>,
    /// Label indices attached to each edge
    edge_labels: FxHashMap<(String, String), Vec<i64>>,
    chosen: FxHashSet<i64>,
    /// Initial colors; a later fact for the same node wins
    colors: IndexMap<String, Label>,
}

impl FactTables {
    fn apply(&mut self, fact: Fact, line: usize) -> LoadResult<()> {
        match fact.predicate.as_str() {
            "node" => {
                let [node] = expect_args::<1>(&fact, line)?;
                let name = node.text().to_string();
                if self.nodes.contains_key(&name) {
                    return Err(LoadError::DuplicateNode(name));
                }
                let id = self.nodes.len();
                self.nodes.insert(name, id);
            }
            "labelname" => {
                let [index, name] = expect_args::<2>(&fact, line)?;
                let index = parse_integer(index, line)?;
                if self.labels.contains_key(&index) {
                    return Err(LoadError::DuplicateLabel(index));
                }
                self.labels.insert(index, name.text().trim_matches('"').to_string());
            }
            "edge" => {
                let [pair] = expect_args::<1>(&fact, line)?;
                let edge = parse_pair(pair, line)?;
                if self.edges.contains_key(&edge) {
                    return Err(LoadError::DuplicateEdge(edge.0, edge.1));
                }
                let id = self.edges.len();
                self.edges.insert(edge, id);
            }
            "tlabel" => {
                let [pair, index] = expect_args::<2>(&fact, line)?;
                let edge = parse_pair(pair, line)?;
                let index = parse_integer(index, line)?;
                self.edge_labels.entry(edge).or_default().push(index);
            }
            "chosen" => {
                let [index] = expect_args::<1>(&fact, line)?;
                self.chosen.insert(parse_integer(index, line)?);
            }
            "color" => {
                let [node, color] = expect_args::<2>(&fact, line)?;
                let color = parse_color(color, line)?;
                self.colors.insert(node.text().to_string(), color);
            }
            other => debug!("Ignoring {}/{} on line {}", other, fact.args.len(), line),
        }
        Ok(())
    }

    fn node_id(&self, name: &str) -> LoadResult<Node> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| LoadError::UnknownNode(name.to_string()))
    }

    fn check_consistency(&self) -> LoadResult<()> {
        for (src, dst) in self.edges.keys() {
            self.node_id(src)?;
            self.node_id(dst)?;
        }
        for ((src, dst), indices) in &self.edge_labels {
            self.node_id(src)?;
            self.node_id(dst)?;
            if let Some(&index) = indices.iter().find(|i| !self.labels.contains_key(i)) {
                return Err(LoadError::UnknownLabel(index));
            }
        }
        for name in self.colors.keys() {
            self.node_id(name)?;
        }
        Ok(())
    }

    fn build(self, source: &str, config: &LoaderConfig) -> LoadResult<LoadedGraph> {
        info!(
            "graph: #nodes={}, #edges={}, #edge-labels={}",
            self.nodes.len(),
            self.edges.len(),
            self.labels.len()
        );
        self.check_consistency()?;

        // Label indices become 0..L in increasing index order.
        let remap: FxHashMap<i64, Label> = self
            .labels
            .keys()
            .enumerate()
            .map(|(dense, &index)| (index, dense as Label))
            .collect();

        let num_nodes = self.nodes.len();
        let mut node_labels = vec![1; num_nodes];
        if !config.uniform_initial_coloring {
            for (name, &color) in &self.colors {
                node_labels[self.node_id(name)?] = color;
            }
        }

        if config.use_chosen_labels && self.chosen.is_empty() && !self.edges.is_empty() {
            warn!("Chosen-label filtering is on but no chosen/1 facts were found; all edges are dropped");
        }

        let mut graph = LabeledGraph::with_nodes(num_nodes, node_labels, true)?;
        for (src, dst) in self.edges.keys() {
            let indices = self
                .edge_labels
                .get(&(src.clone(), dst.clone()))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let &[index] = indices else {
                return Err(LoadError::EdgeLabelArity {
                    src: src.clone(),
                    dst: dst.clone(),
                    found: indices.len(),
                });
            };

            if config.use_chosen_labels && !self.chosen.contains(&index) {
                continue;
            }
            graph.add_edge(self.node_id(src)?, self.node_id(dst)?, remap[&index])?;
        }

        if graph.num_edges() < self.edges.len() {
            debug!(
                "Kept {} of {} edges with chosen labels",
                graph.num_edges(),
                self.edges.len()
            );
        }

        Ok(LoadedGraph {
            source: source.to_string(),
            graph,
            node_names: self.nodes.into_keys().collect(),
            label_names: self.labels.into_values().collect(),
            declared_edges: self.edges.len(),
        })
    }
}

fn expect_args<const N: usize>(fact: &Fact, line: usize) -> LoadResult<[&Term; N]> {
    let found = fact.args.len();
    let args: Vec<&Term> = fact.args.iter().collect();
    args.try_into().map_err(|_| LoadError::Arity {
        line,
        predicate: fact.predicate.clone(),
        expected: N,
        found,
    })
}

fn parse_integer(term: &Term, line: usize) -> LoadResult<i64> {
    term.text().parse().map_err(|_| LoadError::InvalidInteger {
        line,
        text: term.text().to_string(),
    })
}

fn parse_color(term: &Term, line: usize) -> LoadResult<Label> {
    term.text().parse().map_err(|_| LoadError::InvalidInteger {
        line,
        text: term.text().to_string(),
    })
}

fn parse_pair(term: &Term, line: usize) -> LoadResult<(String, String)> {
    let (src, dst) = term.as_pair().ok_or_else(|| LoadError::ExpectedPair {
        line,
        text: term.text().to_string(),
    })?;
    Ok((src.text().to_string(), dst.text().to_string()))
}
