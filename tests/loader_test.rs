use amenability::loader::{load_path, LoadError, LoaderConfig};
use std::fs;
use tempfile::TempDir;

/// Solver output for a 2x2 grid with tuple node names; horizontal edges are
/// labeled `h`, vertical edges `v`.
const GRID: &str = "\
clingo version 5.6.2
Reading from grid.lp
Solving...
Answer: 1
labelname(1,h) labelname(2,v) chosen(1) chosen(2)
node((0,0)) node((0,1)) node((1,0)) node((1,1))
edge(((0,0),(0,1))) tlabel(((0,0),(0,1)),1)
edge(((1,0),(1,1))) tlabel(((1,0),(1,1)),1)
edge(((0,0),(1,0))) tlabel(((0,0),(1,0)),2)
edge(((0,1),(1,1))) tlabel(((0,1),(1,1)),2)
SATISFIABLE

Models       : 1+
";

fn write_file(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_load_solver_output() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "grid.lp", GRID);

    let loaded = load_path(&path, &LoaderConfig::default()).unwrap();
    assert_eq!(loaded.source, path.display().to_string());
    assert_eq!(loaded.node_names, vec!["(0,0)", "(0,1)", "(1,0)", "(1,1)"]);
    assert_eq!(loaded.label_names, vec!["h", "v"]);
    assert_eq!(loaded.graph.num_edges(), 4);
    assert_eq!(loaded.declared_edges, 4);
    assert_eq!(loaded.graph.edge_labels(), &[0, 0, 1, 1]);

    // (0,0) is a source, (1,1) a sink
    assert_eq!(loaded.graph.out_degree(0), 2);
    assert_eq!(loaded.graph.in_degree(0), 0);
    assert_eq!(loaded.graph.in_degree(3), 2);
    assert_eq!(loaded.graph.degree(1), 2);
}

#[test]
fn test_load_without_chosen_facts() {
    let dir = TempDir::new().unwrap();
    let text = GRID.replace(" chosen(1) chosen(2)", "");
    let path = write_file(&dir, "grid.lp", &text);

    let loaded = load_path(&path, &LoaderConfig::default()).unwrap();
    assert_eq!(loaded.graph.num_edges(), 0);
    assert_eq!(loaded.declared_edges, 4);

    let config = LoaderConfig { use_chosen_labels: false, ..Default::default() };
    let loaded = load_path(&path, &config).unwrap();
    assert_eq!(loaded.graph.num_edges(), 4);
}

#[test]
fn test_extension_required() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "grid.txt", GRID);

    let err = load_path(&path, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedExtension(_)));
    assert!(err.to_string().contains("grid.txt"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_path(dir.path().join("absent.lp"), &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_syntax_error_reports_line() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.lp", "node(a).\nnode(b).\nedge((a,b).\n");

    let err = load_path(&path, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::Syntax { line: 3, .. }));
}
