//! Offline retrain
//!
//! Runs the same pipeline as `POST /retrain` and publishes the artifacts:
//! 1. Load the incident and weather tables (remote first, local fallback)
//! 2. Build (road, hour) feature rows
//! 3. Train and compare RandomForest / GradientBoosting / LogisticRegression
//! 4. Upload the best model, scaler and encoders
//!
//! Usage:
//!   cargo run --bin retrain
//!   cargo run --bin retrain -- --config flopred.toml --local-copy models/
//!
//! Environment:
//!   SUPABASE_URL, SUPABASE_KEY - remote blob storage (from .env)

use flopred_service::config::{DEFAULT_CONFIG_PATH, ServiceConfig};
use flopred_service::ingest::DataLoader;
use flopred_service::pipeline::{PipelineSettings, run_pipeline};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🧠 Flood Model Retrain");
    println!("================================\n");

    let args: Vec<String> = env::args().collect();
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut local_copy: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match (args[i].as_str(), args.get(i + 1)) {
            ("--config", Some(path)) => config_path = PathBuf::from(path),
            ("--local-copy", Some(dir)) => local_copy = Some(PathBuf::from(dir)),
            _ => {
                eprintln!("Usage: {} [--config PATH] [--local-copy DIR]", args[0]);
                std::process::exit(1);
            }
        }
        i += 2;
    }

    println!("📋 Loading configuration...");
    let config = ServiceConfig::load(&config_path)?;
    let mut settings = PipelineSettings::from_config(&config)?;
    settings.local_copy = local_copy;
    let store = config.blob_store()?;
    println!("✓ Storage: {}\n", store.describe());

    let loader = DataLoader::new(store.clone(), &config.data.local_dir);
    let outcome = run_pipeline(&loader, store.as_ref(), &settings)?;
    let report = &outcome.report;

    println!("\n📊 Candidates");
    for candidate in &report.candidates {
        println!(
            "   {:<20} AUC {:.4}  acc {:.3}  prec {:.3}  rec {:.3}",
            candidate.name,
            candidate.auc,
            candidate.summary.accuracy,
            candidate.summary.precision,
            candidate.summary.recall
        );
    }

    println!("\n🎉 RETRAIN COMPLETE");
    println!("================================");
    println!("Version:        {}", report.version);
    println!("Best model:     {} (AUC {:.4})", report.best_model, report.best_auc);
    println!("Rows:           {} ({} train / {} test)", report.rows, report.train_rows, report.test_rows);
    println!("Positives:      {}", report.positives);
    if report.synthetic_rows > 0 {
        println!("Synthetic rows: {}", report.synthetic_rows);
    }

    Ok(())
}
