//! k-nearest neighbors on top of `linfa-nn`.

use linfa_nn::distance::L2Dist;
use linfa_nn::{CommonNearestNeighbour, NearestNeighbour};
use ndarray::{Array2, ArrayView2};

use super::{Classifier, backend, check_features, check_fit_input, majority};
use crate::ClassifyError;

/// k-nearest neighbors with Euclidean distance and majority vote.
///
/// Vote ties go to the smallest label. The search index is a k-d tree
/// built over the training set.
#[derive(Debug, Clone)]
pub struct Knn {
    neighbors: usize,
    train: Array2<f64>,
    labels: Vec<usize>,
}

impl Knn {
    /// Create an unfitted k-NN classifier.
    pub fn new(neighbors: usize) -> Result<Self, ClassifyError> {
        if neighbors == 0 {
            return Err(ClassifyError::ZeroNeighbors);
        }
        Ok(Self {
            neighbors,
            train: Array2::zeros((0, 0)),
            labels: Vec::new(),
        })
    }

    /// Configured neighbor count.
    pub fn neighbors(&self) -> usize {
        self.neighbors
    }
}

impl Classifier for Knn {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError> {
        check_fit_input(&x, y)?;
        self.train = x.to_owned();
        self.labels = y.to_vec();
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClassifyError> {
        if self.labels.is_empty() {
            return Err(ClassifyError::NotFitted);
        }
        check_features(self.train.ncols(), &x)?;
        let k = self.neighbors.min(self.labels.len());

        let index = CommonNearestNeighbour::KdTree
            .from_batch(&self.train, L2Dist)
            .map_err(|e| backend("k-nearest neighbor", e))?;

        x.outer_iter()
            .map(|row| {
                let nearest = index.k_nearest(row, k).map_err(|e| backend("k-nearest neighbor", e))?;
                Ok(majority(nearest.into_iter().map(|(_, i)| self.labels[i])))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_tie_goes_to_smallest_label() {
        let x = array![[0.0], [2.0]];
        let mut knn = Knn::new(2).unwrap();
        knn.fit(x.view(), &[4, 1]).unwrap();
        assert_eq!(knn.predict(array![[1.0]].view()).unwrap(), vec![1]);
    }

    #[test]
    fn test_neighbors_capped_at_training_size() {
        let x = array![[0.0], [0.1], [0.2], [5.0], [5.1]];
        let mut knn = Knn::new(50).unwrap();
        knn.fit(x.view(), &[0, 0, 0, 1, 1]).unwrap();
        assert_eq!(knn.neighbors(), 50);
        // Every training row votes, so the majority class wins everywhere
        assert_eq!(knn.predict(array![[5.0], [0.0]].view()).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_single_neighbor() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let mut knn = Knn::new(1).unwrap();
        knn.fit(x.view(), &[0, 1, 2]).unwrap();
        assert_eq!(knn.predict(array![[0.1, 0.9], [0.9, 0.9]].view()).unwrap(), vec![2, 1]);
    }
}
