/// Model selection over the training table.
///
/// Pipeline for one `train` call:
///   1. single-class guard (relabeled resampled rows)
///   2. stratified train / test split, fixed seed
///   3. scaler fit on the training partition
///   4. fit RandomForest, GradientBoosting, LogisticRegression
///   5. held-out AUC; strictly highest wins, ties keep the earlier candidate
///
/// All candidates must fit. A failure of any one aborts the run.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::boosting::{self, BoostingParams, GradientBoosting};
use super::forest::{self, ForestParams, RandomForest};
use super::linear::{self, LinearParams, LogisticModel};
use super::metrics::{ClassificationSummary, roc_auc};
use super::scaler::StandardScaler;
use crate::error::TrainingError;
use crate::features::{FeatureSchema, FeatureTable, LabelEncoder};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Trainer knobs; the `[training]` section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub test_fraction: f64,
    pub seed: u64,
    /// Upper bound on rows added by the single-class guard.
    pub max_synthetic_rows: usize,
    pub forest_trees: usize,
    pub forest_max_depth: usize,
    pub forest_feature_fraction: f64,
    pub boosting_iterations: usize,
    pub boosting_max_depth: u32,
    pub boosting_shrinkage: f32,
    pub logistic_max_iterations: u64,
    pub logistic_alpha: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            max_synthetic_rows: 10,
            forest_trees: 100,
            forest_max_depth: 10,
            forest_feature_fraction: 0.5,
            boosting_iterations: 100,
            boosting_max_depth: 3,
            boosting_shrinkage: 0.1,
            logistic_max_iterations: 1000,
            logistic_alpha: 1.0,
        }
    }
}

impl TrainingConfig {
    fn forest(&self) -> ForestParams {
        ForestParams {
            trees: self.forest_trees,
            max_depth: self.forest_max_depth,
            feature_fraction: self.forest_feature_fraction,
            seed: self.seed,
        }
    }

    fn boosting(&self) -> BoostingParams {
        BoostingParams {
            iterations: self.boosting_iterations,
            max_depth: self.boosting_max_depth,
            shrinkage: self.boosting_shrinkage,
        }
    }

    fn linear(&self) -> LinearParams {
        LinearParams { max_iterations: self.logistic_max_iterations, alpha: self.logistic_alpha }
    }
}

// ---------------------------------------------------------------------------
// Model types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "model")]
pub enum Classifier {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    LogisticRegression(LogisticModel),
}

impl Classifier {
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::RandomForest(_) => forest::MODEL_NAME,
            Classifier::GradientBoosting(_) => boosting::MODEL_NAME,
            Classifier::LogisticRegression(_) => linear::MODEL_NAME,
        }
    }

    /// Positive-class probabilities for unscaled rows. Only the linear
    /// model consumes standardized features.
    pub fn predict_proba(&self, rows: &[Vec<f64>], scaler: &StandardScaler) -> Vec<f64> {
        let probabilities = match self {
            Classifier::RandomForest(m) => m.predict_proba(rows),
            Classifier::GradientBoosting(m) => m.predict_proba(rows),
            Classifier::LogisticRegression(m) => m.predict_proba(&scaler.transform(rows)),
        };
        probabilities.into_iter().map(|p| p.clamp(0.0, 1.0)).collect()
    }
}

/// The winning classifier and the column layout it was trained on.
#[derive(Debug, Serialize, Deserialize)]
pub struct Estimator {
    pub trained_at: DateTime<Utc>,
    pub classifier: Classifier,
    pub schema: FeatureSchema,
}

/// Everything needed to serve predictions; all parts share `version`.
#[derive(Debug)]
pub struct TrainedModel {
    pub version: String,
    pub estimator: Estimator,
    pub scaler: StandardScaler,
    pub weather_main: LabelEncoder,
    pub weather_desc: LabelEncoder,
}

impl TrainedModel {
    pub fn name(&self) -> &'static str {
        self.estimator.classifier.name()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.estimator.schema
    }

    pub fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        self.estimator.classifier.predict_proba(rows, &self.scaler)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub name: String,
    pub auc: f64,
    pub summary: ClassificationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub version: String,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Real flooded rows; `synthetic_rows` are not included.
    pub positives: usize,
    pub negatives: usize,
    /// Relabeled copies appended when the table held a single class.
    pub synthetic_rows: usize,
    pub candidates: Vec<CandidateReport>,
    pub best_model: String,
    pub best_auc: f64,
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub report: TrainingReport,
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Trains every candidate on `table` and keeps the best by held-out AUC.
pub fn train(table: &FeatureTable, config: &TrainingConfig) -> Result<TrainingOutcome, TrainingError> {
    if table.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }

    let mut x = table.matrix();
    let mut y = table.labels();

    // counts of the real rows, before any synthetic minority rows
    let positives = y.iter().filter(|&&l| l == 1).count();
    let negatives = y.len() - positives;
    info!(rows = y.len(), positives, negatives, "flood label distribution");

    let synthetic_rows = add_missing_class(&mut x, &mut y, config);

    let (train_idx, test_idx) = stratified_split(&y, config.test_fraction, config.seed);
    let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<usize>) {
        (idx.iter().map(|&i| x[i].clone()).collect(), idx.iter().map(|&i| y[i]).collect())
    };
    let (x_train, y_train) = pick(&train_idx);
    let (x_test, y_test) = pick(&test_idx);

    let scaler = StandardScaler::fit(&x_train);
    let x_train_scaled = scaler.transform(&x_train);

    let candidates = vec![
        Classifier::RandomForest(RandomForest::fit(&x_train, &y_train, &config.forest())?),
        Classifier::GradientBoosting(GradientBoosting::fit(&x_train, &y_train, &config.boosting())?),
        Classifier::LogisticRegression(LogisticModel::fit(&x_train_scaled, &y_train, &config.linear())?),
    ];

    let mut reports = Vec::with_capacity(candidates.len());
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let scores = candidate.predict_proba(&x_test, &scaler);
        let auc = roc_auc(&y_test, &scores);
        let summary = ClassificationSummary::compute(&y_test, &scores);
        info!(
            model = candidate.name(),
            auc,
            accuracy = summary.accuracy,
            precision = summary.precision,
            recall = summary.recall,
            "evaluated candidate"
        );
        if best.is_none_or(|(_, b)| auc > b) {
            best = Some((i, auc));
        }
        reports.push(CandidateReport { name: candidate.name().to_string(), auc, summary });
    }

    let (best_index, best_auc) = best.ok_or(TrainingError::EmptyTrainingSet)?;
    let classifier = candidates
        .into_iter()
        .nth(best_index)
        .ok_or(TrainingError::EmptyTrainingSet)?;

    let trained_at = Utc::now();
    let version = trained_at.format("%Y%m%dT%H%M%S%.3fZ").to_string();
    info!(model = classifier.name(), auc = best_auc, version = %version, "selected best model");

    let report = TrainingReport {
        version: version.clone(),
        rows: y.len(),
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        positives,
        negatives,
        synthetic_rows,
        candidates: reports,
        best_model: classifier.name().to_string(),
        best_auc,
    };

    let model = TrainedModel {
        version,
        estimator: Estimator { trained_at, classifier, schema: table.schema.clone() },
        scaler,
        weather_main: table.weather_main.clone(),
        weather_desc: table.weather_desc.clone(),
    };

    Ok(TrainingOutcome { model, report })
}

/// When `y` holds one class, appends up to `max_synthetic_rows` sampled
/// copies labeled with the missing class. Returns the number appended.
fn add_missing_class(x: &mut Vec<Vec<f64>>, y: &mut Vec<usize>, config: &TrainingConfig) -> usize {
    let first = y[0];
    if y.iter().any(|&l| l != first) {
        return 0;
    }

    let n = y.len();
    let count = config.max_synthetic_rows.min(n).max(1);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut picked = sample(&mut rng, n, count).into_vec();
    picked.sort_unstable();

    let missing = 1 - first.min(1);
    for i in picked {
        x.push(x[i].clone());
        y.push(missing);
    }
    warn!(added = count, label = missing, "only one class in training data, added relabeled rows");
    count
}

/// Per-class shuffled split. With a positive `test_fraction`, classes with
/// at least two rows keep one row on each side.
fn stratified_split(y: &[usize], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0usize, 1] {
        let mut members: Vec<usize> = (0..y.len()).filter(|&i| y[i].min(1) == class).collect();
        members.shuffle(&mut rng);
        let n = members.len();
        let n_test = if n < 2 || test_fraction <= 0.0 {
            0
        } else {
            ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1)
        };
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
