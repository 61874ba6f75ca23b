/// Error taxonomy for the flood prediction service.
///
/// Each layer owns one enum. Serving-time storage and data failures are
/// degraded by the caller (fallback table, empty severity index, `None`
/// from the registry); retrain-time failures bubble up as `PipelineError`
/// and abort the run without touching the model that is currently served.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Failure talking to a blob store (remote bucket or local directory).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object '{0}' not found")]
    NotFound(String),

    #[error("storage returned HTTP {status} for '{name}'")]
    Http { status: u16, name: String },

    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("injected failure for '{0}'")]
    Injected(String),
}

// ---------------------------------------------------------------------------
// Raw data
// ---------------------------------------------------------------------------

/// Failure turning a raw table into typed records.
#[derive(Debug, Error)]
pub enum DataError {
    /// The table has no usable rows (remote and local copies both missing).
    #[error("table '{0}' is unavailable (remote and local copies missing or empty)")]
    DataUnavailable(String),

    /// A required column is absent from the header row.
    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training table is empty")]
    EmptyTrainingSet,

    #[error("failed to fit {model}: {message}")]
    Fit { model: &'static str, message: String },
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("artifact '{name}' could not be (de)serialized: {source}")]
    Serde {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The four artifacts in the bucket do not belong to the same training run.
    #[error("artifact '{name}' has version {found}, expected {expected}")]
    VersionMismatch { name: String, expected: String, found: String },

    /// Some artifacts of the new version were written before a later one failed.
    #[error("uploaded {uploaded:?} but '{failed}' failed: {source}")]
    PartialUpload {
        uploaded: Vec<String>,
        failed: String,
        #[source]
        source: StorageError,
    },
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("no trained model is available")]
    ModelUnavailable,

    #[error("value '{value}' was not seen for '{column}' at training time")]
    UnseenCategory { column: String, value: String },
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Any failure of a retrain run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

// ---------------------------------------------------------------------------
// Configuration / geocoding
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown timezone '{0}'")]
    Timezone(String),
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoder returned HTTP {0}")]
    Http(u16),
}
