/// Bagged decision-tree ensemble.
///
/// Each tree is a `linfa-trees` CART fit on a bootstrap sample of the rows
/// and a random subset of the columns. Samples carry class-balanced weights
/// (n / (2 · n_class)) so the rare flooded hours are not drowned out. The
/// flood probability is the share of trees voting "flooded".

use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;

pub const MODEL_NAME: &str = "RandomForest";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub trees: usize,
    pub max_depth: usize,
    /// Share of columns each tree may split on.
    pub feature_fraction: f64,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self { trees: 100, max_depth: 10, feature_fraction: 0.5, seed: 42 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestTree {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<ForestTree>,
    width: usize,
}

impl RandomForest {
    pub fn fit(x: &[Vec<f64>], y: &[usize], params: &ForestParams) -> Result<Self, TrainingError> {
        let n = x.len();
        let width = x.first().map_or(0, Vec::len);
        if n == 0 || width == 0 {
            return Err(fit_error("no rows or no columns"));
        }

        let matrix = to_array(x, width);
        let class_weights = balanced_weights(y);
        let subspace = ((width as f64 * params.feature_fraction).ceil() as usize).clamp(1, width);
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut trees = Vec::with_capacity(params.trees);
        for _ in 0..params.trees.max(1) {
            let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut features = sample(&mut rng, width, subspace).into_vec();
            features.sort_unstable();

            let bx = matrix.select(Axis(0), &rows).select(Axis(1), &features);
            let by: Array1<usize> = rows.iter().map(|&i| y[i]).collect();
            let bw: Array1<f32> = rows.iter().map(|&i| class_weights[y[i].min(1)]).collect();

            let dataset = Dataset::new(bx, by).with_weights(bw);
            let tree = DecisionTree::params()
                .max_depth(Some(params.max_depth))
                .fit(&dataset)
                .map_err(fit_error)?;
            trees.push(ForestTree { features, tree });
        }

        Ok(Self { trees, width })
    }

    /// Probability of the flooded class for each row.
    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        if x.is_empty() {
            return Vec::new();
        }
        let matrix = to_array(x, self.width);
        let mut votes = vec![0usize; x.len()];
        for t in &self.trees {
            let sub = matrix.select(Axis(1), &t.features);
            let predicted = t.tree.predict(&sub);
            for (v, p) in votes.iter_mut().zip(predicted.iter()) {
                *v += usize::from(*p == 1);
            }
        }
        let total = self.trees.len().max(1) as f64;
        votes.into_iter().map(|v| v as f64 / total).collect()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Per-class sample weights n / (2 · n_class), indexed by label.
fn balanced_weights(y: &[usize]) -> [f32; 2] {
    let n = y.len() as f32;
    let positives = y.iter().filter(|&&l| l == 1).count() as f32;
    let negatives = n - positives;
    let weight = |count: f32| if count > 0.0 { n / (2.0 * count) } else { 1.0 };
    [weight(negatives), weight(positives)]
}

/// Dense `rows × width` matrix; short rows are zero-padded.
pub(crate) fn to_array(x: &[Vec<f64>], width: usize) -> Array2<f64> {
    Array2::from_shape_fn((x.len(), width), |(i, j)| x[i].get(j).copied().unwrap_or(0.0))
}

fn fit_error(e: impl std::fmt::Display) -> TrainingError {
    TrainingError::Fit { model: MODEL_NAME, message: e.to_string() }
}
