//! Coloring reports
//!
//! A [`ColoringReport`] names nodes the way the input file did, so the
//! `color(X, C)` facts printed by [`ColoringReport::render_text`] can be fed
//! back to the loader as an initial coloring.

use crate::pipeline::RunOutcome;
use amenability_refinement::Label;
use serde::Serialize;

/// One color class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorClass {
    pub color: Label,
    pub size: usize,
    /// Node names, in node order
    pub nodes: Vec<String>,
}

/// Final color of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeColor {
    pub node: String,
    pub color: Label,
}

/// Serializable summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct ColoringReport {
    pub source: String,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_edge_labels: usize,
    pub rounds: usize,
    pub num_colors: usize,
    pub elapsed_secs: f64,
    /// Classes, largest first; ties by color
    pub classes: Vec<ColorClass>,
    /// Node colors, in node order
    pub nodes: Vec<NodeColor>,
}

impl ColoringReport {
    pub fn new(outcome: &RunOutcome) -> Self {
        let loaded = &outcome.loaded;
        let coloring = &outcome.coloring;

        let mut classes: Vec<ColorClass> = coloring
            .colors_to_nodes
            .iter()
            .map(|(&color, nodes)| ColorClass {
                color,
                size: nodes.len(),
                nodes: nodes.iter().map(|&v| loaded.node_name(v).to_string()).collect(),
            })
            .collect();
        classes.sort_by(|a, b| b.size.cmp(&a.size).then(a.color.cmp(&b.color)));

        let nodes = coloring
            .to_vec()
            .into_iter()
            .enumerate()
            .map(|(v, color)| NodeColor {
                node: loaded.node_name(v).to_string(),
                color,
            })
            .collect();

        Self {
            source: loaded.source.clone(),
            num_nodes: outcome.num_nodes(),
            num_edges: outcome.num_edges(),
            num_edge_labels: outcome.num_edge_labels,
            rounds: coloring.rounds,
            num_colors: coloring.num_colors(),
            elapsed_secs: outcome.elapsed.as_secs_f64(),
            classes,
            nodes,
        }
    }

    /// Console report followed by the `color/2` facts
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "WL: #iterations={}, #colors={}, elapsed_time={:.6}\n",
            self.rounds, self.num_colors, self.elapsed_secs
        );

        for class in &self.classes {
            out.push_str(&format!(
                "{} node(s) with color '{}': {}\n",
                class.size,
                class.color,
                class.nodes.join(" ")
            ));
        }
        let total: usize = self.classes.iter().map(|class| class.size).sum();
        out.push_str(&format!("total {} node(s)\n", total));

        out.push_str(&self.render_facts());
        out
    }

    /// `color(X,C).` per node, loadable as an initial coloring
    pub fn render_facts(&self) -> String {
        self.nodes
            .iter()
            .map(|entry| format!("color({},{}).\n", entry.node, entry.color))
            .collect()
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// `node,color` rows with a header
    pub fn render_csv(&self) -> String {
        let mut out = String::from("node,color\n");
        for entry in &self.nodes {
            out.push_str(&format!("{},{}\n", csv_field(&entry.node), entry.color));
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
