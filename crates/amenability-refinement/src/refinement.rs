//! Color refinement (1-dimensional Weisfeiler-Leman)
//!
//! Every round recomputes each node's color from its own color and, for each
//! (direction, edge label) class of incident edges, the sorted multiset of
//! the neighbors' colors. The multisets are folded into a single color with a
//! [`PairingFunction`]. Rounds repeat until the number of distinct colors
//! stops changing; the resulting partition is the stable coloring.

use crate::graph::{EdgeId, Label, LabeledGraph, Node};
use crate::pairing::{PairingFunction, SquareShellPairing};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Color reserved as the end-of-multiset marker; real colors never take it
/// at initialization.
const MARKER: Label = 0;

/// Errors that can occur during refinement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefinementError {
    #[error("Edge {edge} has label {label}, outside [0, {num_edge_labels})")]
    EdgeLabelOutOfRange {
        edge: EdgeId,
        label: Label,
        num_edge_labels: usize,
    },

    #[error("Node {node} has label {label}, which cannot be shifted past the reserved color 0")]
    NodeLabelOutOfRange { node: Node, label: Label },

    #[error("Expected {expected} node labels, got {actual}")]
    NodeLabelCountMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} edge labels, got {actual}")]
    EdgeLabelCountMismatch { expected: usize, actual: usize },

    #[error("Color collision in round {round}: {before} colors became {after}")]
    ColorCollision {
        round: usize,
        before: usize,
        after: usize,
    },
}

pub type RefinementResult<T> = Result<T, RefinementError>;

/// Refinement configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RefinementConfig {
    /// Remap colors to `1..=k` in first-seen node order after every round.
    /// Keeps colors small and readable; raw pairing values are lost.
    pub normalize_colors: bool,
}

/// Result of a stable coloring computation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StableColoring {
    /// Every color of the stable coloring
    pub node_colors: HashSet<Label>,
    /// Color -> nodes with that color, in increasing node order
    pub colors_to_nodes: HashMap<Label, Vec<Node>>,
    /// Node -> its color
    pub node_to_color: HashMap<Node, Label>,
    /// Number of refinement rounds executed
    pub rounds: usize,
    /// Number of distinct colors after each round
    pub color_counts: Vec<usize>,
}

impl StableColoring {
    fn from_coloring(coloring: &[Label], rounds: usize, color_counts: Vec<usize>) -> Self {
        let mut colors_to_nodes: HashMap<Label, Vec<Node>> = HashMap::new();
        let mut node_to_color = HashMap::with_capacity(coloring.len());

        for (v, &color) in coloring.iter().enumerate() {
            colors_to_nodes.entry(color).or_default().push(v);
            node_to_color.insert(v, color);
        }

        Self {
            node_colors: colors_to_nodes.keys().copied().collect(),
            colors_to_nodes,
            node_to_color,
            rounds,
            color_counts,
        }
    }

    /// Number of color classes
    pub fn num_colors(&self) -> usize {
        self.node_colors.len()
    }

    /// Number of colored nodes
    pub fn num_nodes(&self) -> usize {
        self.node_to_color.len()
    }

    pub fn color_of(&self, v: Node) -> Option<Label> {
        self.node_to_color.get(&v).copied()
    }

    /// Nodes in the class of `color` (empty if the color is absent)
    pub fn nodes_with_color(&self, color: Label) -> &[Node] {
        self.colors_to_nodes
            .get(&color)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Class sizes, largest first
    pub fn class_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.colors_to_nodes.values().map(Vec::len).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }

    /// Color classes independent of color values: each class sorted, classes
    /// ordered by their smallest node.
    pub fn partition(&self) -> Vec<Vec<Node>> {
        let mut classes: Vec<Vec<Node>> = self.colors_to_nodes.values().cloned().collect();
        classes.sort_unstable_by_key(|class| class[0]);
        classes
    }

    /// Colors as a vector indexed by node
    pub fn to_vec(&self) -> Vec<Label> {
        let mut coloring = vec![MARKER; self.node_to_color.len()];
        for (&v, &color) in &self.node_to_color {
            coloring[v] = color;
        }
        coloring
    }
}

/// Color refinement over a borrowed graph
pub struct ColorRefinement<'g, P = SquareShellPairing> {
    graph: &'g LabeledGraph,
    pairing: P,
}

impl<'g> ColorRefinement<'g> {
    /// Refinement with the default square-shell pairing
    pub fn new(graph: &'g LabeledGraph) -> Self {
        Self {
            graph,
            pairing: SquareShellPairing,
        }
    }
}

impl<'g, P: PairingFunction> ColorRefinement<'g, P> {
    pub fn with_pairing(graph: &'g LabeledGraph, pairing: P) -> Self {
        Self { graph, pairing }
    }

    pub fn graph(&self) -> &'g LabeledGraph {
        self.graph
    }

    /// Stable coloring of the unlabeled graph: every node starts with color
    /// `1` and every edge carries label `0`.
    pub fn compute_uniform_stable_coloring(
        &self,
        config: &RefinementConfig,
    ) -> RefinementResult<StableColoring> {
        let node_labels = vec![1; self.graph.num_nodes()];
        let edge_labels = vec![0; self.graph.num_edges()];
        self.compute_stable_coloring(&node_labels, 1, &edge_labels, config)
    }

    /// Compute the stable coloring starting from `node_labels`.
    ///
    /// `edge_labels` is aligned with the graph's edge ids and every entry must
    /// lie in `[0, num_edge_labels)`. Inputs are validated before the first
    /// round; a violation returns an error and no coloring.
    pub fn compute_stable_coloring(
        &self,
        node_labels: &[Label],
        num_edge_labels: usize,
        edge_labels: &[Label],
        config: &RefinementConfig,
    ) -> RefinementResult<StableColoring> {
        self.validate(node_labels, num_edge_labels, edge_labels)?;

        let num_nodes = self.graph.num_nodes();
        let mut coloring = vec![MARKER; num_nodes];
        let mut new_coloring = reserve_marker(node_labels)?;

        let mut previous_count = distinct_count(&new_coloring);
        let mut num_old_colors = None;
        let mut num_new_colors = 1;
        let mut color_counts = Vec::new();

        let mut buckets: Vec<Vec<Label>> = vec![Vec::new(); 2 * num_edge_labels];
        let mut new_colors = FxHashSet::default();

        while num_old_colors != Some(num_new_colors) {
            std::mem::swap(&mut coloring, &mut new_coloring);
            num_old_colors = Some(num_new_colors);
            new_colors.clear();

            for v in 0..num_nodes {
                let color = self.refine_node(v, &coloring, num_edge_labels, edge_labels, &mut buckets);
                new_colors.insert(color);
                new_coloring[v] = color;
            }
            num_new_colors = new_colors.len();

            if config.normalize_colors {
                normalize(&mut new_coloring, num_new_colors);
            }

            color_counts.push(num_new_colors);
            let round = color_counts.len();
            debug!("Round {}: {} colors", round, num_new_colors);

            if num_new_colors < previous_count {
                return Err(RefinementError::ColorCollision {
                    round,
                    before: previous_count,
                    after: num_new_colors,
                });
            }
            previous_count = num_new_colors;
        }

        let rounds = color_counts.len();
        info!(
            "Stable coloring reached after {} rounds: {} colors over {} nodes",
            rounds, num_new_colors, num_nodes
        );

        Ok(StableColoring::from_coloring(&new_coloring, rounds, color_counts))
    }

    fn validate(
        &self,
        node_labels: &[Label],
        num_edge_labels: usize,
        edge_labels: &[Label],
    ) -> RefinementResult<()> {
        if edge_labels.len() != self.graph.num_edges() {
            return Err(RefinementError::EdgeLabelCountMismatch {
                expected: self.graph.num_edges(),
                actual: edge_labels.len(),
            });
        }

        if let Some((edge, &label)) = edge_labels
            .iter()
            .enumerate()
            .find(|&(_, &label)| label >= num_edge_labels as Label)
        {
            return Err(RefinementError::EdgeLabelOutOfRange {
                edge,
                label,
                num_edge_labels,
            });
        }

        if node_labels.len() != self.graph.num_nodes() {
            return Err(RefinementError::NodeLabelCountMismatch {
                expected: self.graph.num_nodes(),
                actual: node_labels.len(),
            });
        }

        Ok(())
    }

    /// New color of `v` from the previous round's `coloring`.
    ///
    /// Bucket `l` collects the colors behind outbound edges labeled `l`,
    /// bucket `num_edge_labels + l` those behind inbound edges labeled `l`.
    fn refine_node(
        &self,
        v: Node,
        coloring: &[Label],
        num_edge_labels: usize,
        edge_labels: &[Label],
        buckets: &mut [Vec<Label>],
    ) -> Label {
        for bucket in buckets.iter_mut() {
            bucket.clear();
        }

        for &e in self.graph.outbound_edges(v) {
            let label = edge_labels[e] as usize;
            buckets[label].push(coloring[self.graph.dst(e)]);
        }
        for &e in self.graph.inbound_edges(v) {
            let label = edge_labels[e] as usize;
            buckets[num_edge_labels + label].push(coloring[self.graph.src(e)]);
        }

        // The marker makes every bucket non-empty and keeps buckets of
        // different sizes apart; sorting makes them multisets.
        for bucket in buckets.iter_mut() {
            bucket.push(MARKER);
            bucket.sort_unstable();
        }

        let mut new_color = coloring[v];
        for label in 0..num_edge_labels {
            let outbound = &buckets[label];
            let inbound = &buckets[num_edge_labels + label];
            for &c in outbound.iter().chain(inbound) {
                new_color = self.pairing.pair(new_color, c);
            }
        }
        new_color
    }
}

/// Shift every label by one if any of them equals the marker.
///
/// Fails when the shift would wrap a label onto the marker.
fn reserve_marker(node_labels: &[Label]) -> RefinementResult<Vec<Label>> {
    let shift = Label::from(node_labels.contains(&MARKER));
    node_labels
        .iter()
        .enumerate()
        .map(|(node, &label)| {
            label
                .checked_add(shift)
                .ok_or(RefinementError::NodeLabelOutOfRange { node, label })
        })
        .collect()
}

fn distinct_count(coloring: &[Label]) -> usize {
    coloring.iter().collect::<FxHashSet<_>>().len()
}

/// Remap colors to `1..=k` in first-seen order.
fn normalize(coloring: &mut [Label], num_colors: usize) {
    let mut dense: FxHashMap<Label, Label> = FxHashMap::default();
    for color in coloring.iter_mut() {
        let next = dense.len() as Label + 1;
        *color = *dense.entry(*color).or_insert(next);
    }
    assert_eq!(
        dense.len(),
        num_colors,
        "normalization changed the number of colors"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::CantorPairing;

    fn normalized() -> RefinementConfig {
        RefinementConfig { normalize_colors: true }
    }

    fn undirected(num_nodes: usize, edges: &[(Node, Node)]) -> LabeledGraph {
        LabeledGraph::from_edge_list(num_nodes, edges, vec![1; num_nodes], false).unwrap()
    }

    #[test]
    fn test_single_node() {
        let graph = LabeledGraph::with_nodes(1, vec![1], true).unwrap();
        let coloring = ColorRefinement::new(&graph)
            .compute_stable_coloring(&[1], 1, &[], &RefinementConfig::default())
            .unwrap();

        assert_eq!(coloring.rounds, 1);
        assert_eq!(coloring.num_colors(), 1);
        assert_eq!(coloring.nodes_with_color(coloring.color_of(0).unwrap()), &[0]);
        // pair(pair(1, 0), 0) = pair(2, 0) = 6
        assert_eq!(coloring.color_of(0), Some(6));
    }

    #[test]
    fn test_path_of_three() {
        let graph = undirected(3, &[(0, 1), (1, 2)]);
        let coloring = ColorRefinement::new(&graph)
            .compute_uniform_stable_coloring(&normalized())
            .unwrap();

        assert_eq!(coloring.rounds, 2);
        assert_eq!(coloring.color_counts, vec![2, 2]);
        assert_eq!(coloring.to_vec(), vec![1, 2, 1]);
        assert_eq!(coloring.partition(), vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_two_triangles() {
        let graph = undirected(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
        let coloring = ColorRefinement::new(&graph)
            .compute_uniform_stable_coloring(&RefinementConfig::default())
            .unwrap();

        assert_eq!(coloring.rounds, 1);
        assert_eq!(coloring.num_colors(), 1);
        assert_eq!(coloring.class_sizes(), vec![6]);
    }

    #[test]
    fn test_edge_label_out_of_range() {
        let graph = LabeledGraph::from_edges(2, &[0], &[1], &[5], vec![1, 1], true).unwrap();
        let err = ColorRefinement::new(&graph)
            .compute_stable_coloring(&[1, 1], 2, graph.edge_labels(), &RefinementConfig::default())
            .unwrap_err();

        assert_eq!(
            err,
            RefinementError::EdgeLabelOutOfRange { edge: 0, label: 5, num_edge_labels: 2 }
        );
    }

    #[test]
    fn test_label_count_mismatch() {
        let graph = undirected(3, &[(0, 1)]);
        let refinement = ColorRefinement::new(&graph);
        let config = RefinementConfig::default();

        let err = refinement
            .compute_stable_coloring(&[1, 1], 1, &[0, 0], &config)
            .unwrap_err();
        assert_eq!(err, RefinementError::NodeLabelCountMismatch { expected: 3, actual: 2 });

        let err = refinement
            .compute_stable_coloring(&[1, 1, 1], 1, &[0], &config)
            .unwrap_err();
        assert_eq!(err, RefinementError::EdgeLabelCountMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn test_zero_labels_are_shifted() {
        // Labels {0, 1} behave exactly like labels {1, 2}.
        let graph = undirected(4, &[(0, 1), (1, 2), (2, 3)]);
        let refinement = ColorRefinement::new(&graph);
        let edges = vec![0; graph.num_edges()];
        let config = RefinementConfig::default();

        let with_zero = refinement
            .compute_stable_coloring(&[0, 1, 0, 0], 1, &edges, &config)
            .unwrap();
        let shifted = refinement
            .compute_stable_coloring(&[1, 2, 1, 1], 1, &edges, &config)
            .unwrap();

        assert_eq!(with_zero, shifted);
        assert_eq!(with_zero.num_colors(), 4);
    }

    #[test]
    fn test_shift_cannot_wrap_onto_marker() {
        // a -> b plus isolated c; shifting u64::MAX would turn a and b into
        // the marker and merge the source with the sink.
        let graph = LabeledGraph::from_edge_list(3, &[(0, 1)], vec![1; 3], true).unwrap();
        let refinement = ColorRefinement::new(&graph);
        let config = normalized();

        let err = refinement
            .compute_stable_coloring(&[Label::MAX, Label::MAX, 0], 1, &[0], &config)
            .unwrap_err();
        assert_eq!(err, RefinementError::NodeLabelOutOfRange { node: 0, label: Label::MAX });

        let small = refinement
            .compute_stable_coloring(&[2, 2, 0], 1, &[0], &config)
            .unwrap();
        assert_eq!(small.partition(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_direction_matters() {
        // 0 -> 1 -> 2: source, middle and sink all differ
        let graph = LabeledGraph::from_edge_list(3, &[(0, 1), (1, 2)], vec![1; 3], true).unwrap();
        let coloring = ColorRefinement::new(&graph)
            .compute_uniform_stable_coloring(&normalized())
            .unwrap();

        assert_eq!(coloring.num_colors(), 3);
    }

    #[test]
    fn test_edge_labels_matter() {
        // Star with center 0; leaves 1 and 2 via label 0, leaf 3 via label 1
        let graph = LabeledGraph::from_edges(
            4,
            &[0, 0, 0],
            &[1, 2, 3],
            &[0, 0, 1],
            vec![1; 4],
            false,
        )
        .unwrap();
        let refinement = ColorRefinement::new(&graph);

        let unlabeled = refinement.compute_uniform_stable_coloring(&normalized()).unwrap();
        assert_eq!(unlabeled.partition(), vec![vec![0], vec![1, 2, 3]]);

        let labeled = refinement
            .compute_stable_coloring(&[1; 4], 2, graph.edge_labels(), &normalized())
            .unwrap();
        assert_eq!(labeled.partition(), vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_unused_edge_labels_do_not_split() {
        let graph = undirected(3, &[(0, 1), (1, 2)]);
        let edges = vec![0; graph.num_edges()];
        let coloring = ColorRefinement::new(&graph)
            .compute_stable_coloring(&[1; 3], 4, &edges, &normalized())
            .unwrap();

        assert_eq!(coloring.partition(), vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_normalized_colors_are_dense() {
        // Path of five: classes {0,4}, {1,3}, {2}
        let graph = undirected(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let coloring = ColorRefinement::new(&graph)
            .compute_uniform_stable_coloring(&normalized())
            .unwrap();

        assert_eq!(coloring.to_vec(), vec![1, 2, 3, 2, 1]);
        let mut colors: Vec<Label> = coloring.node_colors.iter().copied().collect();
        colors.sort_unstable();
        assert_eq!(colors, vec![1, 2, 3]);
        assert_eq!(coloring.color_counts, vec![2, 3, 3]);
    }

    #[test]
    fn test_cantor_pairing_same_partition() {
        let graph = undirected(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (1, 5)]);
        let config = RefinementConfig::default();

        let square = ColorRefinement::new(&graph)
            .compute_uniform_stable_coloring(&config)
            .unwrap();
        let cantor = ColorRefinement::with_pairing(&graph, CantorPairing)
            .compute_uniform_stable_coloring(&config)
            .unwrap();

        assert_eq!(square.partition(), cantor.partition());
    }

    struct ConstantPairing;

    impl PairingFunction for ConstantPairing {
        fn pair(&self, _a: Label, _b: Label) -> Label {
            1
        }
    }

    #[test]
    fn test_collision_is_reported() {
        let graph = LabeledGraph::with_nodes(2, vec![1, 2], true).unwrap();
        let err = ColorRefinement::with_pairing(&graph, ConstantPairing)
            .compute_stable_coloring(&[1, 2], 1, &[], &RefinementConfig::default())
            .unwrap_err();

        assert_eq!(err, RefinementError::ColorCollision { round: 1, before: 2, after: 1 });
    }

    #[test]
    fn test_empty_graph() {
        let graph = LabeledGraph::new(false);
        let coloring = ColorRefinement::new(&graph)
            .compute_uniform_stable_coloring(&RefinementConfig::default())
            .unwrap();

        assert_eq!(coloring.num_colors(), 0);
        assert!(coloring.partition().is_empty());
    }
}
