//! Boolean adjacency/closure matrices over the finished node table.
//!
//! The closure is reflexive-free: a true diagonal cell means the node can
//! reach itself through at least one edge, i.e. it sits on a cycle.

use crate::graph::{AnalysisState, Node};

/// Row-major square bit matrix indexed by node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    n: usize,
    cells: Vec<bool>,
}

impl Matrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![false; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        self.cells[i * self.n + j] = value;
    }

    /// Fraction of set cells over all N^2 cells.
    pub fn density(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let set = self.cells.iter().filter(|&&c| c).count();
        set as f64 / (self.n * self.n) as f64
    }
}

/// Direct adjacency and its transitive closure, built once after traversal.
pub struct DependencyMatrices {
    pub direct: Matrix,
    pub closure: Matrix,
}

impl DependencyMatrices {
    pub fn build(state: &AnalysisState) -> Self {
        let n = state.nodes.len();
        let mut direct = Matrix::new(n);
        for (i, node) in state.nodes.iter().enumerate() {
            for &j in &node.deps {
                direct.set(i, j, true);
            }
        }

        // all-pairs boolean reachability; cubic in N, fine for node counts
        // bounded by project file count
        let mut closure = direct.clone();
        for k in 0..n {
            for i in 0..n {
                if !closure.get(i, k) {
                    continue;
                }
                for j in 0..n {
                    if closure.get(k, j) {
                        closure.set(i, j, true);
                    }
                }
            }
        }
        Self { direct, closure }
    }

    /// Ids of nodes that can reach themselves.
    pub fn cyclic_nodes(&self) -> Vec<usize> {
        (0..self.closure.len())
            .filter(|&i| self.closure.get(i, i))
            .collect()
    }

    /// Number of nodes that transitively depend on `j`.
    pub fn fan_in(&self, j: usize) -> usize {
        (0..self.closure.len())
            .filter(|&i| self.closure.get(i, j))
            .count()
    }

    /// Like `fan_in`, but counting only rows whose node is a translation
    /// unit: roughly "how many compiled files pull this header in".
    pub fn fan_in_from_tus(&self, j: usize, nodes: &[Node]) -> usize {
        (0..self.closure.len())
            .filter(|&i| nodes[i].is_translation_unit() && self.closure.get(i, j))
            .count()
    }
}
