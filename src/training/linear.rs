/// L2-regularized logistic regression on standardized features.
///
/// Fitting is delegated to `linfa-logistic`; only the learned weights and
/// intercept are kept, oriented so that a positive margin means "flooded".

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::forest::to_array;
use crate::error::TrainingError;

pub const MODEL_NAME: &str = "LogisticRegression";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearParams {
    pub max_iterations: u64,
    pub alpha: f64,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self { max_iterations: 1000, alpha: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    /// Fits on already-scaled rows.
    pub fn fit(x: &[Vec<f64>], y: &[usize], params: &LinearParams) -> Result<Self, TrainingError> {
        let width = x.first().map_or(0, Vec::len);
        if x.is_empty() || width == 0 {
            return Err(fit_error("no rows or no columns"));
        }

        let matrix = to_array(x, width);
        let targets: Array1<usize> = y.iter().copied().collect();
        let dataset = Dataset::new(matrix, targets);

        let fitted = LogisticRegression::default()
            .alpha(params.alpha)
            .max_iterations(params.max_iterations)
            .fit(&dataset)
            .map_err(fit_error)?;

        // the first label seen is treated as the positive class
        let mut weights = fitted.params().to_vec();
        let mut intercept = fitted.intercept();
        if y[0] != 1 {
            weights.iter_mut().for_each(|w| *w = -*w);
            intercept = -intercept;
        }
        Ok(Self { weights, intercept })
    }

    pub fn from_parts(weights: Vec<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let margin: f64 = self.intercept + row.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f64>();
        sigmoid(margin)
    }

    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|r| self.predict_row(r)).collect()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn fit_error(e: impl std::fmt::Display) -> TrainingError {
    TrainingError::Fit { model: MODEL_NAME, message: e.to_string() }
}
