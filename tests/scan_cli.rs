//! Integration tests for `incgraph scan` CLI behavior.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn incgraph_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_incgraph"))
}

// ── Helper: build a small source tree in a tempdir ──────────

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(&path, content).expect("write fixture");
    path
}

// ── Spec end-to-end example ─────────────────────────────────

#[test]
fn end_to_end_example_graph() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(
        dir.path(),
        "a.cpp",
        "#include \"b.h\"\n#include <vector>\n",
    );
    write(dir.path(), "b.h", "#include \"a.h\"\n");
    write(dir.path(), "a.h", "\n");

    let out = incgraph_bin()
        .args(["scan", root.to_str().expect("utf8 path")])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success(), "exit 0: {:?}", out);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("3 nodes, 2 direct edges"), "{stdout}");
    assert!(stdout.contains("vector"), "unresolved include listed: {stdout}");
    assert!(stdout.contains("22.2%"), "direct density 2/9: {stdout}");
    assert!(stdout.contains("cycles: none"), "{stdout}");
}

#[test]
fn matrix_output_labels_nodes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "a.cpp", "#include \"b.h\"\n");
    write(dir.path(), "b.h", "\n");

    let out = incgraph_bin()
        .args(["scan", root.to_str().expect("utf8 path"), "--matrix"])
        .env("NO_COLOR", "1")
        .output()
        .expect("run incgraph scan --matrix");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("direct dependencies (2x2)"), "{stdout}");
    assert!(stdout.contains("transitive closure (2x2)"), "{stdout}");
    assert!(stdout.contains("#0"), "legend present: {stdout}");
    // row 0 has an edge to column 1 and a diagonal marker
    assert!(stdout.contains('\\'), "diagonal marker present: {stdout}");
}

// ── Cycles ──────────────────────────────────────────────────

#[test]
fn cycle_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "a.h", "#include \"b.h\"\n");
    write(dir.path(), "b.h", "#include \"a.h\"\n");

    let out = incgraph_bin()
        .args(["scan", root.to_str().expect("utf8 path")])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("2 nodes participate in an include cycle"),
        "{stdout}"
    );
}

// ── Sentinels and excludes ──────────────────────────────────

#[test]
fn sentinel_becomes_a_node_instead_of_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "a.cpp", "#include <vector>\n");

    let out = incgraph_bin()
        .args([
            "scan",
            root.to_str().expect("utf8 path"),
            "--sentinel",
            "vector",
        ])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("2 nodes, 1 direct edges"), "{stdout}");
    assert!(!stdout.contains("not found"), "{stdout}");
}

#[test]
fn excluded_subtree_never_appears() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(
        dir.path(),
        "a.cpp",
        "#include \"vendor/v.h\"\n#include \"b.h\"\n",
    );
    write(dir.path(), "vendor/v.h", "\n");
    write(dir.path(), "b.h", "\n");

    let out = incgraph_bin()
        .args([
            "scan",
            root.to_str().expect("utf8 path"),
            "--exclude",
            dir.path().join("vendor").to_str().expect("utf8 path"),
        ])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("2 nodes, 1 direct edges"), "{stdout}");
    assert!(!stdout.contains("v.h"), "{stdout}");
}

// ── Directory mode and search paths ─────────────────────────

#[test]
fn directory_mode_walks_all_sources() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "one.c", "#include \"shared.h\"\n");
    write(dir.path(), "two.c", "#include \"shared.h\"\n");
    write(dir.path(), "shared.h", "\n");

    let out = incgraph_bin()
        .args(["scan", dir.path().to_str().expect("utf8 path")])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("3 nodes, 2 direct edges"), "{stdout}");
}

#[test]
fn include_dir_flag_supplies_search_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "src/a.c", "#include \"util.h\"\n");
    write(dir.path(), "include/util.h", "\n");

    let out = incgraph_bin()
        .args([
            "scan",
            root.to_str().expect("utf8 path"),
            "-I",
            dir.path().join("include").to_str().expect("utf8 path"),
        ])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("2 nodes, 1 direct edges"), "{stdout}");
    assert!(!stdout.contains("not found"), "{stdout}");
}

// ── DOT output ──────────────────────────────────────────────

#[test]
fn dot_file_is_written_with_both_clusters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "a.cpp", "#include \"b.h\"\n");
    write(dir.path(), "b.h", "#include \"c.h\"\n");
    write(dir.path(), "c.h", "\n");
    let dot_path = dir.path().join("graph.dot");

    let out = incgraph_bin()
        .args([
            "scan",
            root.to_str().expect("utf8 path"),
            "--dot",
            dot_path.to_str().expect("utf8 path"),
        ])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success());
    let dot = fs::read_to_string(&dot_path).expect("dot file written");
    assert!(dot.contains("subgraph cluster_direct"), "{dot}");
    assert!(dot.contains("subgraph cluster_closure"), "{dot}");
    assert!(dot.contains("c0 -> c2 [color="), "closure-only edge: {dot}");
}

// ── Fatal errors ────────────────────────────────────────────

#[test]
fn lexer_error_aborts_with_nonzero_exit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "a.c", "int x;\n@\n");

    let out = incgraph_bin()
        .args(["scan", root.to_str().expect("utf8 path")])
        .output()
        .expect("run incgraph scan");

    assert!(!out.status.success(), "fatal lexer error must abort");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no lexical rule matches"), "{stderr}");
    assert!(stderr.contains("a.c"), "file named in error: {stderr}");
}

#[test]
fn malformed_include_aborts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "a.c", "#include 42\n");

    let out = incgraph_bin()
        .args(["scan", root.to_str().expect("utf8 path")])
        .output()
        .expect("run incgraph scan");

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("#include"), "{stderr}");
}

#[test]
fn macro_include_warns_but_continues() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write(dir.path(), "a.c", "#include CONFIG_H\nint x;\n");

    let out = incgraph_bin()
        .args(["scan", root.to_str().expect("utf8 path")])
        .output()
        .expect("run incgraph scan");

    assert!(out.status.success(), "macro includes are not fatal");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("warning"), "{stderr}");
    assert!(stderr.contains("CONFIG_H"), "{stderr}");
}

#[test]
fn missing_input_fails_cleanly() {
    let out = incgraph_bin()
        .args(["scan", "/nonexistent/nowhere.c"])
        .output()
        .expect("run incgraph scan");
    assert!(!out.status.success());
}
