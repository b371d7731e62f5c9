//! `incgraph scan`: analyze from a root source file, or from every source
//! file found under a directory.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::graph::{GraphBuilder, SOURCE_EXTENSIONS};
use crate::report::{self, OutputOptions};
use crate::resolve::absolutize;

pub fn run(
    path: &Path,
    include_dirs: &[PathBuf],
    excludes: &[PathBuf],
    sentinels: &[String],
    out: &OutputOptions,
    verbose: u8,
) -> Result<()> {
    let target = absolutize(path)?;
    let search_paths = include_dirs
        .iter()
        .map(|d| absolutize(d))
        .collect::<Result<Vec<_>>>()?;
    let excludes = excludes
        .iter()
        .map(|e| absolutize(e))
        .collect::<Result<Vec<_>>>()?;

    let walked = if target.is_dir() {
        collect_sources(&target)?
    } else if target.is_file() {
        vec![target.clone()]
    } else {
        bail!("no such file or directory: {}", target.display());
    };
    if walked.is_empty() {
        bail!("no C/C++ sources under {}", target.display());
    }
    if verbose > 0 {
        eprintln!("{} root file(s), {} search path(s)", walked.len(), search_paths.len());
    }

    let mut builder = GraphBuilder::new(excludes, sentinels.to_vec(), verbose);
    for root in &walked {
        builder.process(root, &search_paths)?;
    }
    let state = builder.into_state();

    // directory mode sanity check: walked files the traversal never reached
    if verbose > 0 && target.is_dir() {
        let unreached: Vec<&PathBuf> = walked.iter().filter(|p| !state.was_visited(p)).collect();
        for path in unreached {
            eprintln!("never reached: {}", path.display());
        }
    }

    report::emit(&state, out)
}

/// Walk `dir` for source files, deterministically ordered.
fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e));
        if matches {
            sources.push(path.to_path_buf());
        }
    }
    Ok(sources)
}
