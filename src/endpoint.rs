/// HTTP endpoint for flood likelihood and severity
///
/// Endpoints:
/// - GET  /, /health    - Service health check
/// - POST /api/predict  - Flood probability from weather features
/// - POST /predict      - Area, severity and probability for a lat/lon
/// - GET  /roads        - Known road sectors (debugging)
/// - POST /retrain      - Retrain, publish and swap in a new model
///
/// Routing ignores trailing slashes and query strings. `route` is a pure
/// function of the shared state and the request, so handlers are testable
/// without a socket; the server loop only moves bytes.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, RwLock, TryLockError};
use threadpool::ThreadPool;
use tracing::{debug, error, info, warn};

use crate::error::PredictError;
use crate::features::FeatureMap;
use crate::geocode::{Area, ReverseGeocoder, resolve_area};
use crate::ingest::{DataLoader, Table};
use crate::pipeline::{PipelineSettings, run_pipeline};
use crate::predictor::Predictor;
use crate::registry::ModelRegistry;
use crate::severity::{Severity, SeverityIndex};
use crate::storage::BlobStore;

pub const SERVICE_NAME: &str = "flopred_service";
pub const UNKNOWN: &str = "Unknown";

const ENDPOINTS: [&str; 6] = [
    "GET /",
    "GET /health",
    "POST /api/predict",
    "POST /predict",
    "GET /roads",
    "POST /retrain",
];

/// Weather fields the probability endpoints require.
pub const REQUIRED_FEATURES: [&str; 9] = [
    "main_temp",
    "main_humidity",
    "main_pressure",
    "rain1h",
    "wind_speed",
    "hour",
    "day_of_week",
    "month",
    "is_weekend",
];

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct FloodFeatures {
    pub main_temp: f64,
    pub main_humidity: f64,
    pub main_pressure: f64,
    pub rain1h: f64,
    pub wind_speed: f64,
    pub hour: f64,
    pub day_of_week: f64,
    pub month: f64,
    pub is_weekend: f64,
    #[serde(default)]
    pub weather_main: Option<String>,
    #[serde(default)]
    pub weather_description: Option<String>,
    #[serde(default)]
    pub road_sector: Option<String>,
}

impl FloodFeatures {
    pub fn to_feature_map(&self) -> FeatureMap {
        let values = [
            self.main_temp,
            self.main_humidity,
            self.main_pressure,
            self.rain1h,
            self.wind_speed,
            self.hour,
            self.day_of_week,
            self.month,
            self.is_weekend,
        ];
        FeatureMap {
            values: REQUIRED_FEATURES.iter().map(|k| k.to_string()).zip(values).collect(),
            weather_main: self.weather_main.clone(),
            weather_description: self.weather_description.clone(),
            road_sector: self.road_sector.clone(),
        }
    }
}

/// Response of `POST /predict`.
#[derive(Debug, Serialize)]
pub struct CombinedPrediction {
    pub area: Area,
    pub severity: Severity,
    pub ai_probability: Option<f64>,
    pub timestamp: String,
}

/// One entry of `GET /roads`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadEntry {
    pub road_sector: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Shared State
// ---------------------------------------------------------------------------

/// Raw incident table plus the severity index built from it.
pub struct RoadData {
    pub table: Table,
    pub severity: SeverityIndex,
}

impl RoadData {
    pub fn load(loader: &DataLoader, settings: &PipelineSettings) -> Self {
        let name = &settings.incidents_table;
        let table = loader.load(name);
        let severity = if table.is_empty() {
            warn!(table = %name, "no incident data, severity lookups will report no flood");
            SeverityIndex::empty()
        } else {
            SeverityIndex::from_table(&table, name).unwrap_or_else(|e| {
                warn!(table = %name, error = %e, "incident table unusable for severity");
                SeverityIndex::empty()
            })
        };
        Self { table, severity }
    }

    pub fn roads(&self) -> Vec<RoadEntry> {
        let coordinate = |v: Option<&str>| v.and_then(|s| s.parse::<f64>().ok()).filter(|f| f.is_finite());
        self.table
            .rows()
            .map(|row| RoadEntry {
                road_sector: row.get("road_sector").unwrap_or(UNKNOWN).to_string(),
                city: row.get("city").unwrap_or(UNKNOWN).to_string(),
                latitude: coordinate(row.get("latitude")),
                longitude: coordinate(row.get("longitude")),
            })
            .collect()
    }
}

pub struct AppState {
    loader: DataLoader,
    artifacts: Arc<dyn BlobStore>,
    registry: Arc<ModelRegistry>,
    predictor: Predictor,
    geocoder: Box<dyn ReverseGeocoder>,
    settings: PipelineSettings,
    roads: RwLock<Arc<RoadData>>,
    retrain_lock: Mutex<()>,
}

impl AppState {
    pub fn new(
        loader: DataLoader,
        artifacts: Arc<dyn BlobStore>,
        geocoder: Box<dyn ReverseGeocoder>,
        settings: PipelineSettings,
    ) -> Self {
        let registry = Arc::new(ModelRegistry::new(artifacts.clone()));
        let roads = RoadData::load(&loader, &settings);
        Self {
            predictor: Predictor::new(registry.clone()),
            loader,
            artifacts,
            registry,
            geocoder,
            settings,
            roads: RwLock::new(Arc::new(roads)),
            retrain_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn road_data(&self) -> Arc<RoadData> {
        self.roads.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn refresh_road_data(&self) {
        let fresh = Arc::new(RoadData::load(&self.loader, &self.settings));
        *self.roads.write().unwrap_or_else(|p| p.into_inner()) = fresh;
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Dispatches one request to its handler. Returns (status, JSON body).
pub fn route(state: &AppState, method: &str, url: &str, body: &str) -> (u16, Value) {
    let path = normalize_path(url);
    debug!(method, path = %path, "request");

    match (method, path.as_str()) {
        ("GET", "/") | ("GET", "/health") => handle_health(state),
        ("POST", "/api/predict") => handle_api_predict(state, body),
        ("POST", "/predict") => handle_combined_predict(state, body),
        ("GET", "/roads") => handle_roads(state),
        ("POST", "/retrain") => handle_retrain(state),
        _ => (
            404,
            json!({
                "error": "Not found",
                "available_endpoints": ENDPOINTS
            }),
        ),
    }
}

/// Drops the query string and trailing slashes ("/roads/?x=1" -> "/roads").
pub fn normalize_path(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

fn handle_health(state: &AppState) -> (u16, Value) {
    (
        200,
        json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "model_loaded": state.registry.is_loaded()
        }),
    )
}

fn handle_api_predict(state: &AppState, body: &str) -> (u16, Value) {
    let features: FloodFeatures = match serde_json::from_str(body) {
        Ok(f) => f,
        Err(e) => return (400, json!({ "error": format!("invalid request body: {}", e) })),
    };

    match state.predictor.predict(&features.to_feature_map()) {
        Ok(p) => (200, json!({ "flood_probability": p })),
        Err(PredictError::ModelUnavailable) => (503, json!({ "detail": "Model not available" })),
        Err(e @ PredictError::UnseenCategory { .. }) => (422, json!({ "detail": e.to_string() })),
    }
}

fn handle_combined_predict(state: &AppState, body: &str) -> (u16, Value) {
    let data: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return (400, json!({ "error": format!("invalid request body: {}", e) })),
    };

    let (Some(lat), Some(lon)) = (data["latitude"].as_f64(), data["longitude"].as_f64()) else {
        return (400, json!({ "error": "latitude and longitude are required" }));
    };

    let area = resolve_area(state.geocoder.as_ref(), lat, lon);
    let severity = match (&area.city, &area.road) {
        (Some(city), Some(road)) => state.road_data().severity.severity(city, road),
        _ => Severity::none(),
    };

    let ai_probability = feature_map_from_json(&data).and_then(|features| {
        match state.predictor.predict(&features) {
            Ok(p) => Some(p),
            Err(e) => {
                debug!(error = %e, "no model probability for combined prediction");
                None
            }
        }
    });

    let response = CombinedPrediction {
        area,
        severity,
        ai_probability,
        timestamp: Utc::now().with_timezone(&state.settings.timezone).to_rfc3339(),
    };
    match serde_json::to_value(&response) {
        Ok(v) => (200, v),
        Err(e) => (500, json!({ "error": e.to_string() })),
    }
}

/// All nine weather fields as numbers, or `None`.
fn feature_map_from_json(data: &Value) -> Option<FeatureMap> {
    let mut features = FeatureMap::new();
    for key in REQUIRED_FEATURES {
        features = features.with(key, data.get(key)?.as_f64()?);
    }
    features.weather_main = data["weather_main"].as_str().map(str::to_string);
    features.weather_description = data["weather_description"].as_str().map(str::to_string);
    features.road_sector = data["road_sector"].as_str().map(str::to_string);
    Some(features)
}

fn handle_roads(state: &AppState) -> (u16, Value) {
    match serde_json::to_value(state.road_data().roads()) {
        Ok(v) => (200, v),
        Err(e) => (500, json!({ "error": e.to_string() })),
    }
}

fn handle_retrain(state: &AppState) -> (u16, Value) {
    let _guard = match state.retrain_lock.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::Poisoned(p)) => p.into_inner(),
        Err(TryLockError::WouldBlock) => {
            return (409, json!({ "status": "error", "message": "A retrain is already running." }));
        }
    };

    match run_pipeline(&state.loader, state.artifacts.as_ref(), &state.settings) {
        Ok(outcome) => {
            let report = outcome.report;
            state.registry.set(outcome.model);
            state.refresh_road_data();
            (
                200,
                json!({
                    "status": "success",
                    "message": "Model retrained and reloaded.",
                    "version": report.version,
                    "best_model": report.best_model,
                    "auc": report.best_auc,
                    "report": report
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "retrain failed");
            (500, json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Serves requests on `host:port` with `workers` handler threads.
pub fn start_endpoint_server(
    state: Arc<AppState>,
    host: &str,
    port: u16,
    workers: usize,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = tiny_http::Server::http(format!("{}:{}", host, port))?;
    let pool = ThreadPool::new(workers.max(1));

    println!("📡 HTTP endpoint listening on http://{}:{}", host, port);
    for endpoint in ENDPOINTS {
        println!("   {}", endpoint);
    }
    println!();
    info!(host, port, workers, "endpoint server started");

    for mut request in server.incoming_requests() {
        let state = state.clone();
        pool.execute(move || {
            let mut body = String::new();
            let (status, json) = match request.as_reader().read_to_string(&mut body) {
                Ok(_) => {
                    let method = request.method().as_str().to_string();
                    let url = request.url().to_string();
                    route(&state, &method, &url, &body)
                }
                Err(e) => (400, json!({ "error": format!("unreadable body: {}", e) })),
            };
            if let Err(e) = request.respond(create_response(status, json)) {
                warn!(error = %e, "failed to send response");
            }
        });
    }
    Ok(())
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));
    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
