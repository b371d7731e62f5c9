//! `incgraph db`: analyze every record of a compilation database, each with
//! the search paths extracted from its own compiler invocation.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::compile_db;
use crate::graph::GraphBuilder;
use crate::report::{self, OutputOptions};
use crate::resolve::absolutize;

pub fn run(
    db_path: &Path,
    excludes: &[PathBuf],
    sentinels: &[String],
    out: &OutputOptions,
    verbose: u8,
) -> Result<()> {
    let records = compile_db::load(db_path)?;
    if verbose > 0 {
        eprintln!("{} record(s) in {}", records.len(), db_path.display());
    }
    let excludes = excludes
        .iter()
        .map(|e| absolutize(e))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = GraphBuilder::new(excludes, sentinels.to_vec(), verbose);
    for record in &records {
        let root = record.source_path();
        let search_paths = record.search_paths();
        if verbose > 1 {
            eprintln!(
                "record {} with {} search path(s)",
                root.display(),
                search_paths.len()
            );
        }
        builder.process(&root, &search_paths)?;
    }

    report::emit(&builder.into_state(), out)
}
