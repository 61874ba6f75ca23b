//! Flood Prediction Service - HTTP server
//!
//! Serves flood probability, historical severity and retraining over HTTP:
//! 1. Loads configuration (flopred.toml + environment)
//! 2. Loads the incident table for severity lookups and /roads
//! 3. Warms the model registry from the artifact store (if artifacts exist)
//! 4. Serves requests until killed
//!
//! Usage:
//!   cargo run --release                           # Serve on the configured port
//!   cargo run --release -- --port 8080            # Override the port
//!   cargo run --release -- --config other.toml    # Alternate config file
//!
//! Environment:
//!   SUPABASE_URL, SUPABASE_KEY - remote blob storage (local dir otherwise)
//!   PORT                       - listen port
//!   RUST_LOG                   - log filter (default: info)

use flopred_service::config::{DEFAULT_CONFIG_PATH, ServiceConfig};
use flopred_service::endpoint::{self, AppState};
use flopred_service::geocode::NominatimGeocoder;
use flopred_service::ingest::DataLoader;
use flopred_service::pipeline::PipelineSettings;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🌧️  Flood Prediction Service");
    println!("============================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut port_override: Option<u16> = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                match args.get(i + 1).and_then(|p| p.parse().ok()) {
                    Some(port) => port_override = Some(port),
                    None => {
                        eprintln!("Error: --port requires a port number");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "--config" => {
                match args.get(i + 1) {
                    Some(path) => config_path = PathBuf::from(path),
                    None => {
                        eprintln!("Error: --config requires a path");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--port PORT] [--config PATH]", args[0]);
                std::process::exit(1);
            }
        }
    }

    println!("📋 Loading configuration...");
    let mut config = ServiceConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    });
    if let Some(port) = port_override {
        config.server.port = port;
    }
    let settings = PipelineSettings::from_config(&config).unwrap_or_else(|e| {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    });
    println!("✓ Configuration loaded\n");

    let store = config.blob_store().unwrap_or_else(|e| {
        eprintln!("\n❌ Storage unavailable: {}\n", e);
        std::process::exit(1);
    });
    println!("📦 Storage: {}", store.describe());

    let geocoder = NominatimGeocoder::new(&config.geocoding.nominatim_url, config.geocoding.timeout())
        .unwrap_or_else(|e| {
            eprintln!("\n❌ Geocoder setup failed: {}\n", e);
            std::process::exit(1);
        });

    println!("📊 Loading incident data...");
    let loader = DataLoader::new(store.clone(), &config.data.local_dir);
    let state = Arc::new(AppState::new(loader, store, Box::new(geocoder), settings));
    println!("✓ {} incident rows, {} severity keys\n", state.road_data().table.len(), state.road_data().severity.len());

    match state.registry().get() {
        Some(model) => println!("✓ Model {} ({}) loaded\n", model.version, model.name()),
        None => println!("⚠ No model available yet; POST /retrain to train one\n"),
    }

    println!("🚀 Starting HTTP endpoint server...");
    if let Err(e) = endpoint::start_endpoint_server(state, &config.server.host, config.server.port, config.server.workers) {
        eprintln!("❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}
