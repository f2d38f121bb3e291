//! Bootstrap random forest regressor

use crate::error::{ModelError, Result};
use crate::tree::{RegressionTree, TreeConfig};
use ndarray::ArrayView2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random forest configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Draw a bootstrap sample for each tree
    pub bootstrap: bool,
    /// Random seed; tree `i` uses `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    const fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

/// Average of independently grown regression trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl RandomForestRegressor {
    /// Create an unfitted forest.
    pub const fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Forest configuration.
    pub const fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Whether [`Self::fit`] has been called.
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Train every tree on its own bootstrap sample of the rows.
    ///
    /// # Errors
    /// * [`ModelError::Shape`] if `y` is not aligned with `x`
    /// * [`ModelError::InsufficientData`] for an empty matrix or zero trees
    pub fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[f64]) -> Result<()> {
        let n = x.nrows();
        if y.len() != n {
            return Err(ModelError::Shape(format!("{} targets for {} rows", y.len(), n)));
        }
        if n == 0 || x.ncols() == 0 {
            return Err(ModelError::InsufficientData(format!(
                "cannot fit a forest on a {}x{} matrix",
                n,
                x.ncols()
            )));
        }
        if self.config.n_trees == 0 {
            return Err(ModelError::InsufficientData("forest needs at least one tree".into()));
        }

        let all_rows: Vec<usize> = (0..n).collect();
        let tree_config = self.config.tree_config();

        self.trees = (0..self.config.n_trees)
            .map(|i| {
                let rows = if self.config.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(i as u64));
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    all_rows.clone()
                };
                let mut tree = RegressionTree::new(tree_config);
                tree.fit(x, y, &rows);
                tree
            })
            .collect();

        self.n_features = x.ncols();
        self.feature_importances = self.aggregate_importances();

        debug!(
            trees = self.trees.len(),
            rows = n,
            features = self.n_features,
            "Fitted random forest"
        );
        Ok(())
    }

    /// Per-tree normalised impurity decrease, averaged and renormalised.
    fn aggregate_importances(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            let sum: f64 = tree.importances().iter().sum();
            if sum > 0.0 {
                for (t, imp) in total.iter_mut().zip(tree.importances()) {
                    *t += imp / sum;
                }
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for t in &mut total {
                *t /= sum;
            }
        }
        total
    }

    /// Mean prediction of all trees, one value per row.
    ///
    /// # Errors
    /// * [`ModelError::NotFitted`] before [`Self::fit`]
    /// * [`ModelError::Shape`] if the column count differs from training
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(ModelError::Shape(format!(
                "forest trained on {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }

        let n_trees = self.trees.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let row = row.to_vec();
                self.trees.iter().map(|t| t.predict_row(&row)).sum::<f64>() / n_trees
            })
            .collect())
    }

    /// Feature importances in column order, summing to 1 when any split was made.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn linear_data(n: usize) -> (Array2<f64>, Vec<f64>) {
        let mut x = Array2::zeros((n, 3));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let a = i as f64;
            let b = ((i * 7) % 11) as f64;
            x[[i, 0]] = a;
            x[[i, 1]] = b;
            x[[i, 2]] = 1.0;
            y.push(3.0 * a + 0.1 * b);
        }
        (x, y)
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = linear_data(60);
        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 20,
            ..ForestConfig::default()
        });
        forest.fit(x.view(), &y).unwrap();

        assert_eq!(forest.n_trees(), 20);
        let predictions = forest.predict(x.view()).unwrap();
        assert_eq!(predictions.len(), 60);
        for (p, t) in predictions.iter().zip(&y) {
            assert!((p - t).abs() < 15.0);
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (x, y) = linear_data(40);
        let config = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };
        let mut a = RandomForestRegressor::new(config);
        let mut b = RandomForestRegressor::new(config);
        a.fit(x.view(), &y).unwrap();
        b.fit(x.view(), &y).unwrap();
        assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
    }

    #[test]
    fn test_importances_favour_signal() {
        let (x, y) = linear_data(50);
        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        });
        forest.fit(x.view(), &y).unwrap();

        let imp = forest.feature_importances();
        assert_abs_diff_eq!(imp.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert!(imp[0] > imp[1]);
        assert_eq!(imp[2], 0.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let forest = RandomForestRegressor::default();
        let x = Array2::<f64>::zeros((1, 3));
        assert!(matches!(forest.predict(x.view()), Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_wrong_width() {
        let (x, y) = linear_data(10);
        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 2,
            ..ForestConfig::default()
        });
        forest.fit(x.view(), &y).unwrap();
        let narrow = Array2::<f64>::zeros((1, 2));
        assert!(matches!(forest.predict(narrow.view()), Err(ModelError::Shape(_))));
    }
}
