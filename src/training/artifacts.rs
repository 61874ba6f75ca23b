/// Model artifact persistence.
///
/// A trained model is stored as four JSON objects under fixed names:
///
///   best_flood_model.pkl       classifier + feature schema
///   flood_model_scaler.pkl     standard scaler
///   weather_main_encoder.pkl   weather.main label encoder
///   weather_desc_encoder.pkl   weather.description label encoder
///
/// The names are kept for compatibility with existing buckets; the content
/// is JSON. Every object is wrapped as `{ "version": ..., "payload": ... }`
/// and loading refuses a set whose versions disagree.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::trainer::{Estimator, TrainedModel};
use crate::error::ArtifactError;
use crate::storage::BlobStore;

pub const MODEL_ARTIFACT: &str = "best_flood_model.pkl";
pub const SCALER_ARTIFACT: &str = "flood_model_scaler.pkl";
pub const WEATHER_MAIN_ARTIFACT: &str = "weather_main_encoder.pkl";
pub const WEATHER_DESC_ARTIFACT: &str = "weather_desc_encoder.pkl";

/// Upload order. The model goes first so a reader that sees a new model
/// and an old scaler gets a version mismatch, not a silent mix.
pub const ARTIFACT_NAMES: [&str; 4] = [
    MODEL_ARTIFACT,
    SCALER_ARTIFACT,
    WEATHER_MAIN_ARTIFACT,
    WEATHER_DESC_ARTIFACT,
];

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: &'a str,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: String,
    payload: T,
}

/// Serializes all four artifacts, then uploads them in order.
///
/// Nothing is uploaded if any artifact fails to serialize. A storage
/// failure after at least one upload is `ArtifactError::PartialUpload`.
pub fn save_model(store: &dyn BlobStore, model: &TrainedModel) -> Result<Vec<String>, ArtifactError> {
    let encoded = [
        (MODEL_ARTIFACT, encode(MODEL_ARTIFACT, &model.version, &model.estimator)?),
        (SCALER_ARTIFACT, encode(SCALER_ARTIFACT, &model.version, &model.scaler)?),
        (WEATHER_MAIN_ARTIFACT, encode(WEATHER_MAIN_ARTIFACT, &model.version, &model.weather_main)?),
        (WEATHER_DESC_ARTIFACT, encode(WEATHER_DESC_ARTIFACT, &model.version, &model.weather_desc)?),
    ];

    let mut uploaded = Vec::with_capacity(encoded.len());
    for (name, bytes) in &encoded {
        if let Err(source) = store.put(name, bytes) {
            if uploaded.is_empty() {
                return Err(ArtifactError::Storage(source));
            }
            warn!(failed = *name, uploaded = ?uploaded, "artifact upload interrupted");
            return Err(ArtifactError::PartialUpload { uploaded, failed: name.to_string(), source });
        }
        uploaded.push(name.to_string());
    }

    info!(version = %model.version, destination = %store.describe(), "uploaded model artifacts");
    Ok(uploaded)
}

/// Loads and cross-checks all four artifacts.
pub fn load_model(store: &dyn BlobStore) -> Result<TrainedModel, ArtifactError> {
    let model: Envelope<Estimator> = decode(store, MODEL_ARTIFACT)?;
    let version = model.version;

    let scaler = decode(store, SCALER_ARTIFACT)?;
    let weather_main = decode(store, WEATHER_MAIN_ARTIFACT)?;
    let weather_desc = decode(store, WEATHER_DESC_ARTIFACT)?;

    Ok(TrainedModel {
        estimator: model.payload,
        scaler: check_version(SCALER_ARTIFACT, &version, scaler)?,
        weather_main: check_version(WEATHER_MAIN_ARTIFACT, &version, weather_main)?,
        weather_desc: check_version(WEATHER_DESC_ARTIFACT, &version, weather_desc)?,
        version,
    })
}

fn encode<T: Serialize>(name: &str, version: &str, payload: &T) -> Result<Vec<u8>, ArtifactError> {
    serde_json::to_vec(&EnvelopeRef { version, payload })
        .map_err(|source| ArtifactError::Serde { name: name.to_string(), source })
}

fn decode<T: DeserializeOwned>(store: &dyn BlobStore, name: &str) -> Result<Envelope<T>, ArtifactError> {
    let bytes = store.fetch(name)?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Serde { name: name.to_string(), source })
}

fn check_version<T>(name: &str, expected: &str, envelope: Envelope<T>) -> Result<T, ArtifactError> {
    if envelope.version != expected {
        return Err(ArtifactError::VersionMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            found: envelope.version,
        });
    }
    Ok(envelope.payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
