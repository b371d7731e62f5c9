//! Depth-first construction of the include graph.
//!
//! One `GraphBuilder` runs a whole analysis: it owns the lexer, the node
//! arena and all traversal bookkeeping. Roots are fed in one at a time (the
//! build-database mode calls `process` once per record, each with its own
//! search paths) and share a single visited set, so a header reached from two
//! translation units is read exactly once.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::include::{extract_includes, IncludeSpec};
use crate::lexer::Lexer;
use crate::normalize::normalize;
use crate::resolve::resolve;

/// Extensions treated as compiled translation units (vs. headers).
pub const TU_EXTENSIONS: &[&str] = &["c", "cpp"];

/// Extensions the directory walker considers source files.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp"];

/// One graph node: a file (keyed by its absolute path) or a sentinel (keyed
/// by its bare configured name). The arena index of a node is its id; ids are
/// assigned in discovery order and are dense `0..N`.
#[derive(Debug)]
pub struct Node {
    pub key: String,
    /// Ids of nodes this one includes, deduplicated, deterministic order.
    pub deps: BTreeSet<usize>,
}

impl Node {
    pub fn is_translation_unit(&self) -> bool {
        Path::new(&self.key)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TU_EXTENSIONS.contains(&e))
    }
}

/// Everything the traversal accumulates. Mutated only by `GraphBuilder`,
/// read-only once handed to the closure engine and reporting.
#[derive(Debug, Default)]
pub struct AnalysisState {
    pub nodes: Vec<Node>,
    index: HashMap<String, usize>,
    visited: HashSet<PathBuf>,
    /// Include specs that resolved to no file and matched no sentinel.
    pub not_found: BTreeSet<String>,
}

impl AnalysisState {
    pub fn node_id(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn direct_edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.deps.len()).sum()
    }

    pub fn was_visited(&self, path: &Path) -> bool {
        self.visited.contains(path)
    }

    fn add_node(&mut self, key: String) -> usize {
        let id = self.nodes.len();
        self.index.insert(key.clone(), id);
        self.nodes.push(Node {
            key,
            deps: BTreeSet::new(),
        });
        id
    }
}

/// A file whose includes are being worked through. `next` advances lazily so
/// sentinel creation and recursion happen in source order, which is what
/// keeps node ids reproducible.
struct Frame {
    node: usize,
    dir: PathBuf,
    includes: Vec<IncludeSpec>,
    next: usize,
}

enum Entry {
    /// Already in the graph; the caller links to it directly.
    Visited(usize),
    /// Under an exclude prefix: never visited, never a node, never an edge.
    Excluded,
    /// Freshly opened for processing.
    Opened(Frame),
}

pub struct GraphBuilder {
    lexer: Lexer,
    excludes: Vec<PathBuf>,
    sentinels: Vec<String>,
    verbose: u8,
    state: AnalysisState,
}

impl GraphBuilder {
    pub fn new(excludes: Vec<PathBuf>, sentinels: Vec<String>, verbose: u8) -> Self {
        Self {
            lexer: Lexer::new(),
            excludes,
            sentinels,
            verbose,
            state: AnalysisState::default(),
        }
    }

    pub fn into_state(self) -> AnalysisState {
        self.state
    }

    /// Traverse the include graph rooted at `root` (absolute path). The
    /// recursion runs on an explicit frame stack so include depth is bounded
    /// by memory, not by the native call stack; ordering is identical to the
    /// recursive formulation: a node gets its id at discovery, and an edge is
    /// recorded only after the target has been fully processed (or was
    /// already in the graph).
    pub fn process(&mut self, root: &Path, search_paths: &[PathBuf]) -> Result<()> {
        let frame = match self.enter(root)? {
            Entry::Opened(frame) => frame,
            Entry::Visited(_) | Entry::Excluded => return Ok(()),
        };
        let mut stack = vec![frame];
        while let Some(top) = stack.last_mut() {
            if top.next >= top.includes.len() {
                let done = stack.pop().expect("non-empty stack");
                if let Some(parent) = stack.last() {
                    self.state.nodes[parent.node].deps.insert(done.node);
                }
                continue;
            }
            let spec = top.includes[top.next].clone();
            top.next += 1;
            let parent = top.node;
            let dir = top.dir.clone();

            match resolve(&dir, &spec.path, search_paths) {
                Some(path) => match self.enter(&path)? {
                    Entry::Opened(frame) => stack.push(frame),
                    // diamond or cycle; the node already exists
                    Entry::Visited(id) => {
                        self.state.nodes[parent].deps.insert(id);
                    }
                    Entry::Excluded => {}
                },
                None => {
                    if self.sentinels.iter().any(|s| *s == spec.path) {
                        let id = self.sentinel_node(&spec.path);
                        self.state.nodes[parent].deps.insert(id);
                    } else {
                        if self.verbose > 0 {
                            eprintln!("not found: {} (line {})", spec.path, spec.line);
                        }
                        self.state.not_found.insert(spec.path.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Visited/exclude gate, then read + normalize + tokenize + extract.
    /// Fatal lexer and parse errors propagate with the file attached.
    fn enter(&mut self, path: &Path) -> Result<Entry> {
        if self.state.visited.contains(path) {
            let key = path.to_string_lossy();
            let id = self
                .state
                .node_id(&key)
                .context("visited file missing from node table")?;
            return Ok(Entry::Visited(id));
        }
        if self.is_excluded(path) {
            if self.verbose > 1 {
                eprintln!("excluded: {}", path.display());
            }
            return Ok(Entry::Excluded);
        }
        self.state.visited.insert(path.to_path_buf());
        if self.verbose > 0 {
            eprintln!("processing {}", path.display());
        }

        let source = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let content = normalize(&source);
        let tokens = self
            .lexer
            .tokenize(&content)
            .with_context(|| format!("lexer error in {}", path.display()))?;
        let extraction = extract_includes(&tokens, &content)
            .with_context(|| format!("parse error in {}", path.display()))?;

        for (name, line) in &extraction.macro_includes {
            eprintln!(
                "{} {}:{}: #include {} uses a macro; macro expansion is not performed, include skipped",
                "warning:".yellow().bold(),
                path.display(),
                line,
                name
            );
        }
        if self.verbose > 1 {
            for inc in &extraction.includes {
                eprintln!("  {} #include {}", inc.line, inc);
            }
        }

        let id = self.state.add_node(path.to_string_lossy().into_owned());
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        Ok(Entry::Opened(Frame {
            node: id,
            dir,
            includes: extraction.includes,
            next: 0,
        }))
    }

    /// Placeholder node for a configured external name; zero out-degree by
    /// construction since nothing is ever processed for it.
    fn sentinel_node(&mut self, name: &str) -> usize {
        match self.state.node_id(name) {
            Some(id) => id,
            None => self.state.add_node(name.to_string()),
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excludes.iter().any(|prefix| path.starts_with(prefix))
    }
}
