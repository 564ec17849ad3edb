//! Amenability
//!
//! Stable colorings of labeled graphs read from answer-set solver output.
//!
//! # Modules
//!
//! - [`loader`]: `.lp` fact files (`node/1`, `edge/1`, `tlabel/2`, ...) to a
//!   [`LabeledGraph`]
//! - [`pipeline`]: edge-label densification, refinement and timing
//! - [`report`]: text, JSON and CSV renderings of a stable coloring
//!
//! The refinement itself lives in the `amenability-refinement` crate and is
//! re-exported here.

pub mod loader;
pub mod pipeline;
pub mod report;

pub use amenability_refinement::{
    ColorRefinement, Label, LabeledGraph, Node, RefinementConfig, RefinementError,
    StableColoring,
};
pub use loader::{load_path, parse_str, LoadError, LoadedGraph, LoaderConfig};
pub use pipeline::{run_graph, run_path, PipelineError, RunConfig, RunOutcome};
pub use report::ColoringReport;
