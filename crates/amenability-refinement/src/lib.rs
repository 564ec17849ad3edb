//! Stable coloring of labeled graphs by color refinement (1-WL)
//!
//! The crate has three parts:
//! - [`graph`]: a directed multigraph with per-edge labels and bidirectional adjacency
//! - [`pairing`]: injective folds of two colors into one
//! - [`refinement`]: the fixpoint loop computing the stable coloring
//!
//! ```rust
//! use amenability_refinement::{ColorRefinement, LabeledGraph, RefinementConfig};
//!
//! // Undirected path 0 - 1 - 2
//! let mut graph = LabeledGraph::with_nodes(3, vec![1; 3], false).unwrap();
//! graph.add_edge(0, 1, 0).unwrap();
//! graph.add_edge(1, 2, 0).unwrap();
//!
//! let config = RefinementConfig { normalize_colors: true };
//! let coloring = ColorRefinement::new(&graph)
//!     .compute_uniform_stable_coloring(&config)
//!     .unwrap();
//!
//! assert_eq!(coloring.num_colors(), 2);
//! assert_eq!(coloring.color_of(0), coloring.color_of(2));
//! assert_ne!(coloring.color_of(0), coloring.color_of(1));
//! ```

pub mod graph;
pub mod pairing;
pub mod refinement;

pub use graph::{Edge, EdgeId, GraphError, GraphResult, Label, LabeledGraph, Node};
pub use pairing::{checked_pairing, CantorPairing, PairingFunction, SquareShellPairing};
pub use refinement::{
    ColorRefinement, RefinementConfig, RefinementError, RefinementResult, StableColoring,
};
