//! CART regression tree.
//!
//! Splits minimise the summed squared error of the two children. Candidate
//! thresholds for a feature are found with one sorted scan using prefix sums,
//! so every feature costs `O(n log n)` per node. Nodes live in a flat arena
//! indexed from the root at 0.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth (None = grow until leaves are pure or too small)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Fitted regression tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Create an unfitted tree.
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            importances: Vec::new(),
        }
    }

    /// Grow the tree on the given rows of `x` (rows may repeat).
    pub fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[f64], rows: &[usize]) {
        self.nodes.clear();
        self.importances = vec![0.0; x.ncols()];
        let mut rows = rows.to_vec();
        if rows.is_empty() {
            self.nodes.push(Node::Leaf { value: 0.0 });
            return;
        }
        self.grow(x, y, &mut rows, 0);
    }

    fn grow(&mut self, x: ArrayView2<'_, f64>, y: &[f64], rows: &mut [usize], depth: usize) -> usize {
        let n = rows.len();
        let sum: f64 = rows.iter().map(|&r| y[r]).sum();
        let mean = sum / n as f64;
        let sse: f64 = rows.iter().map(|&r| (y[r] - mean).powi(2)).sum();

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < self.config.min_samples_split || sse <= f64::EPSILON {
            return index;
        }

        let Some(best) = self.best_split(x, y, rows) else {
            return index;
        };

        self.importances[best.feature] += sse - best.sse;

        let mut boundary = 0;
        for i in 0..n {
            if x[[rows[i], best.feature]] <= best.threshold {
                rows.swap(i, boundary);
                boundary += 1;
            }
        }

        let (left_rows, right_rows) = rows.split_at_mut(boundary);
        let left = self.grow(x, y, left_rows, depth + 1);
        let right = self.grow(x, y, right_rows, depth + 1);

        self.nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        index
    }

    fn best_split(&self, x: ArrayView2<'_, f64>, y: &[f64], rows: &[usize]) -> Option<BestSplit> {
        let n = rows.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let total: f64 = rows.iter().map(|&r| y[r]).sum();
        let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();

        let mut best: Option<BestSplit> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in 0..x.ncols() {
            pairs.clear();
            pairs.extend(rows.iter().map(|&r| (x[[r, feature]], y[r])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            for i in 1..n {
                let (prev_x, prev_y) = pairs[i - 1];
                left_sum += prev_y;
                left_sq += prev_y * prev_y;

                let next_x = pairs[i].0;
                if next_x <= prev_x || i < min_leaf || n - i < min_leaf {
                    continue;
                }

                let (n_left, n_right) = (i as f64, (n - i) as f64);
                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left)
                    + (right_sq - right_sum * right_sum / n_right);

                if best.as_ref().is_none_or(|b| sse < b.sse) {
                    let mut threshold = prev_x + (next_x - prev_x) / 2.0;
                    if threshold >= next_x {
                        threshold = prev_x;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        sse,
                    });
                }
            }
        }
        best
    }

    /// Whether [`Self::fit`] has been called.
    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Predict one row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return f64::NAN,
            }
        }
    }

    /// Total squared-error reduction attributed to each feature.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}
