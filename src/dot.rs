//! Graphviz output: one digraph with a cluster for the direct edges and a
//! cluster for the transitive closure. Closure-only edges are drawn in a
//! muted color so the hops added by the closure stand apart from real
//! `#include` lines; node fill darkens with transitive fan-in on a fixed
//! discrete scale.

use std::fmt::Write;
use std::path::Path;

use crate::closure::DependencyMatrices;
use crate::graph::Node;

/// Light-to-dark fills, bucketed by fan-in.
const FILL_SCALE: &[&str] = &[
    "#ffffff", "#dbe9f6", "#b5d2ea", "#8bb8dd", "#5f9bcd", "#3a7ebd",
];

fn fill_for(fan_in: usize) -> &'static str {
    let bucket = match fan_in {
        0 => 0,
        1 => 1,
        2 => 2,
        3..=4 => 3,
        5..=8 => 4,
        _ => 5,
    };
    FILL_SCALE[bucket]
}

fn label(node: &Node) -> String {
    let name = Path::new(&node.key)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| node.key.clone());
    name.replace('"', "\\\"")
}

/// Render the whole graph description.
pub fn render(nodes: &[Node], matrices: &DependencyMatrices) -> String {
    let n = nodes.len();
    let mut out = String::with_capacity(4096);
    let _ = writeln!(out, "digraph includes {{");
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(
        out,
        "  node [shape=box, fontname=\"monospace\", fontsize=10, style=filled];"
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "  subgraph cluster_direct {{");
    let _ = writeln!(out, "    label=\"direct dependencies\";");
    for (i, node) in nodes.iter().enumerate() {
        let _ = writeln!(
            out,
            "    d{} [label=\"{}\", fillcolor=\"{}\"];",
            i,
            label(node),
            fill_for(matrices.fan_in(i))
        );
    }
    for i in 0..n {
        for j in 0..n {
            if matrices.direct.get(i, j) {
                let _ = writeln!(out, "    d{i} -> d{j};");
            }
        }
    }
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out);

    let _ = writeln!(out, "  subgraph cluster_closure {{");
    let _ = writeln!(out, "    label=\"dependency transitive closure\";");
    for (i, node) in nodes.iter().enumerate() {
        let _ = writeln!(
            out,
            "    c{} [label=\"{}\", fillcolor=\"{}\"];",
            i,
            label(node),
            fill_for(matrices.fan_in(i))
        );
    }
    for i in 0..n {
        for j in 0..n {
            if !matrices.closure.get(i, j) {
                continue;
            }
            if matrices.direct.get(i, j) {
                let _ = writeln!(out, "    c{i} -> c{j};");
            } else {
                let _ = writeln!(out, "    c{i} -> c{j} [color=\"gray60\"];");
            }
        }
    }
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out, "}}");
    out
}
