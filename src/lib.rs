/// flopred_service: road flood likelihood and severity service.
///
/// # Module structure
///
/// ```text
/// flopred_service
/// ├── model       - shared record types (FloodIncident, WeatherObservation, DepthCategory)
/// ├── error       - error enums per layer (DataError, TrainingError, ArtifactError, …)
/// ├── config      - service configuration loader (flopred.toml + environment)
/// ├── storage     - blob store trait with Supabase, local-dir and in-memory backends
/// ├── ingest
/// │   ├── table   - header-normalized CSV tables
/// │   ├── records - typed incidents / observations from raw tables
/// │   ├── loader  - remote-first table loading with local fallback
/// │   └── fixtures (test only) - representative raw exports
/// ├── features
/// │   ├── schema   - feature column layout and vectorization
/// │   ├── encoding - label encoders for weather categories
/// │   └── builder  - (road, hour) training rows from incidents + weather
/// ├── training
/// │   ├── forest / boosting / linear - candidate classifiers
/// │   ├── scaler, metrics            - standardization, ROC AUC
/// │   ├── trainer   - split, fit, select best candidate
/// │   └── artifacts - versioned model artifacts in the blob store
/// ├── registry    - lazily loaded, swappable current model
/// ├── predictor   - feature map -> flood probability
/// ├── severity    - historical depth-based severity lookup
/// ├── geocode     - reverse geocoding (Nominatim)
/// ├── pipeline    - load -> features -> train -> publish
/// └── endpoint    - HTTP API
/// ```

/// Public modules
pub mod config;
pub mod endpoint;
pub mod error;
pub mod features;
pub mod geocode;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod registry;
pub mod severity;
pub mod storage;
pub mod training;
