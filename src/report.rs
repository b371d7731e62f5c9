//! Terminal reporting: summary statistics, optional matrix grids, and the
//! DOT file hand-off. Results go to stdout; diagnostics stay on stderr.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::Write as IoWrite;
use std::path::PathBuf;

use crate::closure::{DependencyMatrices, Matrix};
use crate::dot;
use crate::graph::AnalysisState;

/// What to emit after traversal; shared by both commands.
#[derive(Debug, Default)]
pub struct OutputOptions {
    /// Print adjacency and closure grids.
    pub matrix: bool,
    /// Write DOT output here; `-` means stdout.
    pub dot: Option<PathBuf>,
}

/// Build the matrices once and produce all requested output.
pub fn emit(state: &AnalysisState, opts: &OutputOptions) -> Result<()> {
    let matrices = DependencyMatrices::build(state);
    print_summary(state, &matrices);
    if opts.matrix {
        println!();
        print_matrix("direct dependencies", &matrices.direct);
        println!();
        print_matrix("transitive closure", &matrices.closure);
        print_legend(state);
    }
    if let Some(path) = &opts.dot {
        let rendered = dot::render(&state.nodes, &matrices);
        if path.as_os_str() == "-" {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("cannot write DOT output to stdout")?;
        } else {
            fs::write(path, rendered)
                .with_context(|| format!("cannot write DOT output to {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn print_summary(state: &AnalysisState, matrices: &DependencyMatrices) {
    println!(
        "{} {} nodes, {} direct edges",
        "include graph:".bold(),
        state.nodes.len(),
        state.direct_edge_count()
    );

    if !state.not_found.is_empty() {
        let list: Vec<&str> = state.not_found.iter().map(String::as_str).collect();
        println!(
            "{} {}",
            format!("not found ({}):", list.len()).yellow(),
            list.join(", ")
        );
    }

    println!(
        "direct density: {}  closure density: {}",
        format!("{:.1}%", matrices.direct.density() * 100.0).cyan(),
        format!("{:.1}%", matrices.closure.density() * 100.0).cyan()
    );

    let cyclic = matrices.cyclic_nodes();
    if cyclic.is_empty() {
        println!("cycles: {}", "none".green());
    } else {
        println!(
            "cycles: {}",
            format!("{} nodes participate in an include cycle", cyclic.len()).red()
        );
    }

    if !state.nodes.is_empty() {
        println!("\n{}", "transitive dependents (all / from TUs):".bold());
        for (id, node) in state.nodes.iter().enumerate() {
            let total = matrices.fan_in(id);
            let from_tus = matrices.fan_in_from_tus(id, &state.nodes);
            println!("  {:>4} {:>3} / {:<3} {}", format!("#{id}"), total, from_tus, node.key);
        }
    }
}

/// Labeled grid: `#` edge present, `.` edge absent, diagonal marked and
/// highlighted when the node sits on a cycle.
fn print_matrix(title: &str, matrix: &Matrix) {
    let n = matrix.len();
    println!("{} ({n}x{n})", title.bold());
    if n == 0 {
        return;
    }
    let width = (n - 1).to_string().len();
    print!("{:>width$} ", "");
    for j in 0..n {
        print!(" {j:>width$}");
    }
    println!();
    for i in 0..n {
        print!("{i:>width$} ");
        for j in 0..n {
            let cell = if i == j {
                if matrix.get(i, j) {
                    "#".red().bold().to_string()
                } else {
                    "\\".dimmed().to_string()
                }
            } else if matrix.get(i, j) {
                "#".to_string()
            } else {
                ".".dimmed().to_string()
            };
            // glyphs are one display column; pad by hand because the colored
            // escape codes would defeat format-width padding
            print!("{}{cell}", " ".repeat(width));
        }
        println!();
    }
}

fn print_legend(state: &AnalysisState) {
    println!();
    for (id, node) in state.nodes.iter().enumerate() {
        println!("  {:>4} {}", format!("#{id}"), node.key);
    }
}
