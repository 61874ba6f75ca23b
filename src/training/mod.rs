/// Model training, selection and artifact persistence.
pub mod artifacts;
pub mod boosting;
pub mod forest;
pub mod linear;
pub mod metrics;
pub mod scaler;
pub mod trainer;

pub use artifacts::{ARTIFACT_NAMES, load_model, save_model};
pub use trainer::{
    CandidateReport, Classifier, Estimator, TrainedModel, TrainingConfig, TrainingOutcome,
    TrainingReport, train,
};
