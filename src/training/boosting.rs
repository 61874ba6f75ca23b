/// Gradient-boosted trees via the `gbdt` crate, log-likelihood loss.
///
/// `gbdt` works in `f32` and wants labels in {-1, +1}; with the
/// log-likelihood loss `predict` already returns the positive-class
/// probability.

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;

pub const MODEL_NAME: &str = "GradientBoosting";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostingParams {
    pub iterations: usize,
    pub max_depth: u32,
    pub shrinkage: f32,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self { iterations: 100, max_depth: 3, shrinkage: 0.1 }
    }
}

#[derive(Serialize, Deserialize)]
pub struct GradientBoosting {
    model: GBDT,
    width: usize,
}

impl std::fmt::Debug for GradientBoosting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradientBoosting").field("width", &self.width).finish_non_exhaustive()
    }
}

impl GradientBoosting {
    pub fn fit(x: &[Vec<f64>], y: &[usize], params: &BoostingParams) -> Result<Self, TrainingError> {
        let width = x.first().map_or(0, Vec::len);
        if x.is_empty() || width == 0 {
            return Err(TrainingError::Fit {
                model: MODEL_NAME,
                message: "no rows or no columns".to_string(),
            });
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(width);
        cfg.set_max_depth(params.max_depth);
        cfg.set_iterations(params.iterations);
        cfg.set_shrinkage(params.shrinkage);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);

        let mut data: DataVec = x
            .iter()
            .zip(y)
            .map(|(row, &label)| {
                let label = if label == 1 { 1.0 } else { -1.0 };
                Data::new_training_data(to_f32(row), 1.0, label, None)
            })
            .collect();

        let mut model = GBDT::new(&cfg);
        model.fit(&mut data);
        Ok(Self { model, width })
    }

    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        if x.is_empty() {
            return Vec::new();
        }
        let data: DataVec = x.iter().map(|row| Data::new_test_data(to_f32(row), None)).collect();
        self.model
            .predict(&data)
            .into_iter()
            .map(|p| f64::from(p).clamp(0.0, 1.0))
            .collect()
    }
}

fn to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![(i % 10) as f64, (i % 3) as f64]).collect();
        let y = x.iter().map(|r| usize::from(r[0] >= 5.0)).collect();
        (x, y)
    }

    fn small() -> BoostingParams {
        BoostingParams { iterations: 20, ..BoostingParams::default() }
    }

    #[test]
    fn test_boosting_ranks_wet_rows_higher() {
        let (x, y) = separable();
        let model = GradientBoosting::fit(&x, &y, &small()).unwrap();
        let p = model.predict_proba(&[vec![9.0, 0.0], vec![1.0, 0.0]]);
        assert!(p[0] > p[1]);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_boosting_is_deterministic() {
        let (x, y) = separable();
        let a = GradientBoosting::fit(&x, &y, &small()).unwrap().predict_proba(&x);
        let b = GradientBoosting::fit(&x, &y, &small()).unwrap().predict_proba(&x);
        assert_eq!(a, b);
    }

    #[test]
    fn test_boosting_survives_json() {
        let (x, y) = separable();
        let model = GradientBoosting::fit(&x, &y, &small()).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: GradientBoosting = serde_json::from_str(&json).unwrap();
        assert_eq!(back.predict_proba(&x), model.predict_proba(&x));
        assert!(format!("{:?}", back).contains("width: 2"));
    }
}
