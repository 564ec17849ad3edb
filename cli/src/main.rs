//! wl: stable colorings of `.lp` graph files
//!
//! Reads each file, runs color refinement and prints the coloring.

use amenability::loader::LoaderConfig;
use amenability::pipeline::{self, RunConfig};
use amenability::{ColoringReport, RefinementConfig};
use anyhow::Context;
use clap::Parser;
use comfy_table::{ContentArrangement, Table};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "wl", version, about = "Stable coloring by color refinement (1-WL)")]
struct Cli {
    /// Graph files (.lp)
    #[arg(required = true)]
    filenames: Vec<PathBuf>,

    /// Log debugging info
    #[arg(long)]
    debug: bool,

    /// Keep every edge, not only those with chosen labels
    #[arg(long, env = "AMENABILITY_DISABLE_CHOSEN_LABELS")]
    disable_chosen_labels: bool,

    /// Renumber colors 1..k after each round
    #[arg(long, env = "AMENABILITY_NORMALIZE_COLORS")]
    normalize_colors: bool,

    /// Ignore color/2 facts in the input
    #[arg(long, env = "AMENABILITY_UNIFORM_INITIAL_COLORING")]
    uniform_initial_coloring: bool,

    /// Output format
    #[arg(long, default_value = "text", env = "AMENABILITY_FORMAT")]
    format: OutputFormat,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Table,
    Json,
    Csv,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            loader: LoaderConfig {
                uniform_initial_coloring: self.uniform_initial_coloring,
                use_chosen_labels: !self.disable_chosen_labels,
            },
            refinement: RefinementConfig {
                normalize_colors: self.normalize_colors,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.run_config();
    for filename in &cli.filenames {
        if let Err(e) = run_file(filename, &config, &cli.format) {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run_file(path: &Path, config: &RunConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let outcome = pipeline::run_path(path, config)
        .with_context(|| format!("failed to color '{}'", path.display()))?;
    let report = ColoringReport::new(&outcome);

    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
        OutputFormat::Csv => print!("{}", report.render_csv()),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["color", "size", "nodes"]);

            for class in &report.classes {
                table.add_row(vec![
                    class.color.to_string(),
                    class.size.to_string(),
                    class.nodes.join(" "),
                ]);
            }

            println!("{}", table);
            println!(
                "{} color(s), {} node(s), {} round(s)",
                report.num_colors, report.num_nodes, report.rounds
            );
        }
    }

    Ok(())
}
