/// Batch retrain: load -> build features -> train -> publish artifacts.
///
/// Any failure aborts the run with a `PipelineError`. The caller decides
/// what to do with the returned model; a failed run never reaches the
/// registry, so the served model stays whatever it was.

use chrono_tz::Tz;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::{ConfigError, PipelineError};
use crate::features::build_features;
use crate::ingest::DataLoader;
use crate::storage::{BlobStore, LocalDirStore};
use crate::training::{TrainingConfig, TrainingOutcome, save_model, train};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub incidents_table: String,
    pub weather_table: String,
    pub timezone: Tz,
    pub training: TrainingConfig,
    /// Also write the artifacts to this directory (best effort).
    pub local_copy: Option<PathBuf>,
}

impl PipelineSettings {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            incidents_table: config.data.incidents_table.clone(),
            weather_table: config.data.weather_table.clone(),
            timezone: config.timezone()?,
            training: config.training.clone(),
            local_copy: None,
        })
    }
}

pub fn run_pipeline(
    loader: &DataLoader,
    artifacts: &dyn BlobStore,
    settings: &PipelineSettings,
) -> Result<TrainingOutcome, PipelineError> {
    info!(incidents = %settings.incidents_table, weather = %settings.weather_table, "starting retrain");

    let incidents = loader.load_incidents(&settings.incidents_table, settings.timezone)?;
    let weather = loader.load_weather(&settings.weather_table, settings.timezone)?;
    info!(incidents = incidents.len(), observations = weather.len(), "raw tables loaded");

    let table = build_features(&incidents, &weather, settings.timezone);
    let outcome = train(&table, &settings.training)?;

    save_model(artifacts, &outcome.model)?;

    if let Some(dir) = &settings.local_copy {
        let local = LocalDirStore::new(dir);
        match save_model(&local, &outcome.model) {
            Ok(_) => info!(path = %dir.display(), "wrote local artifact copies"),
            Err(e) => warn!(path = %dir.display(), error = %e, "local artifact copy failed"),
        }
    }

    info!(
        version = %outcome.report.version,
        model = %outcome.report.best_model,
        auc = outcome.report.best_auc,
        "retrain complete"
    );
    Ok(outcome)
}
