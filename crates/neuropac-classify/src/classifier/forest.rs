//! Random forest of `linfa-trees` decision trees.
//!
//! Each tree is grown on a bootstrap sample of the rows and a random
//! subset of `max(1, floor(sqrt(features)))` columns. Prediction is a
//! majority vote over the trees.

use linfa::traits::{Fit, Predict};
use linfa_trees::DecisionTree;
use ndarray::{Array1, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::index;

use super::{Classifier, backend, check_features, check_fit_input, labelled, majority};
use crate::ClassifyError;

/// Seed of the bootstrap and feature draws; a forest refit on the same
/// data grows the same trees.
const FOREST_SEED: u64 = 0x5eed;

/// One tree and the columns it was grown on.
#[derive(Debug, Clone)]
struct Tree {
    features: Vec<usize>,
    model: DecisionTree<f64, usize>,
}

/// Bagged decision trees over random feature subspaces.
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_trees: usize,
    n_features: usize,
    trees: Vec<Tree>,
}

impl RandomForest {
    /// Create an unfitted forest of `n_trees` trees.
    pub fn new(n_trees: usize) -> Result<Self, ClassifyError> {
        if n_trees == 0 {
            return Err(ClassifyError::ZeroTrees);
        }
        Ok(Self {
            n_trees,
            n_features: 0,
            trees: Vec::new(),
        })
    }

    /// Configured tree count.
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }
}

/// Columns drawn for each tree.
fn subspace_size(n_features: usize) -> usize {
    ((n_features as f64).sqrt().floor() as usize).clamp(1, n_features)
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError> {
        check_fit_input(&x, y)?;
        let (n_samples, n_features) = x.dim();
        let n_columns = subspace_size(n_features);
        let mut rng = StdRng::seed_from_u64(FOREST_SEED);

        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let mut features = index::sample(&mut rng, n_features, n_columns).into_vec();
            features.sort_unstable();
            let rows: Vec<usize> = (0..n_samples).map(|_| rng.random_range(0..n_samples)).collect();

            let records = x.select(Axis(1), &features);
            let records = records.select(Axis(0), &rows);
            let labels: Vec<usize> = rows.iter().map(|&r| y[r]).collect();
            let model = DecisionTree::<f64, usize>::params()
                .fit(&labelled(records.view(), &labels))
                .map_err(|e| backend("random forest", e))?;
            trees.push(Tree { features, model });
        }

        self.n_features = n_features;
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClassifyError> {
        if self.trees.is_empty() {
            return Err(ClassifyError::NotFitted);
        }
        check_features(self.n_features, &x)?;

        let votes: Vec<Array1<usize>> = self
            .trees
            .iter()
            .map(|tree| {
                let records = x.select(Axis(1), &tree.features);
                let labels: Array1<usize> = tree.model.predict(&records);
                labels
            })
            .collect();

        Ok((0..x.nrows())
            .map(|row| majority(votes.iter().map(|labels| labels[row])))
            .collect())
    }
}
