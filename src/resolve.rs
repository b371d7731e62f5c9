//! Include spec -> concrete file resolution.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Resolve an include spec against the including file's directory, then each
/// search directory in order. Quoted and angle forms resolve identically;
/// this tool does not model the system-header distinction. The spec string is
/// used verbatim; escapes are never interpreted, and no canonicalization
/// happens beyond the existence check, so symlinked spellings stay distinct.
pub fn resolve(including_dir: &Path, spec: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let local = including_dir.join(spec);
    if local.is_file() {
        return Some(local);
    }
    for dir in search_paths {
        let candidate = dir.join(spec);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Anchor a CLI-supplied path to the current directory without touching the
/// filesystem. Used once per input at the boundary so that everything past it
/// deals in absolute paths only.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = env::current_dir().context("cannot determine working directory")?;
        Ok(cwd.join(path))
    }
}
