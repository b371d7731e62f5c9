//! Build-database input: an ordered JSON array of compilation records, each
//! giving a working directory, a source file and the compiler invocation.
//! Only `-I` search paths are pulled out of the command; this is a token
//! pattern match, not shell parsing.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    /// The invocation as a single string...
    #[serde(default)]
    pub command: Option<String>,
    /// ...or as an argv array; generators emit one or the other.
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

lazy_static! {
    /// `-Ifoo` and `-I foo`.
    static ref INCLUDE_FLAG: Regex = Regex::new(r"-I\s*(\S+)").expect("valid -I pattern");
}

impl CompileCommand {
    /// Absolute path of the record's source file.
    pub fn source_path(&self) -> PathBuf {
        join_record_path(&self.directory, &self.file)
    }

    /// Ordered `-I` directories from the invocation, anchored to the record's
    /// working directory when relative.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let command = self.command_line();
        INCLUDE_FLAG
            .captures_iter(&command)
            .filter_map(|caps| caps.get(1))
            .map(|m| join_record_path(&self.directory, Path::new(m.as_str())))
            .collect()
    }

    fn command_line(&self) -> String {
        match (&self.command, &self.arguments) {
            (Some(cmd), _) => cmd.clone(),
            (None, Some(args)) => args.join(" "),
            (None, None) => String::new(),
        }
    }
}

fn join_record_path(directory: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        directory.join(path)
    }
}

/// Read and parse a compilation database file.
pub fn load(path: &Path) -> Result<Vec<CompileCommand>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read build database {}", path.display()))?;
    let records: Vec<CompileCommand> = serde_json::from_str(&content)
        .with_context(|| format!("malformed build database {}", path.display()))?;
    Ok(records)
}
