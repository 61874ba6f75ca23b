/// Service configuration loader - parses flopred.toml
///
/// Every section is optional and falls back to its defaults, so the
/// service runs with no config file at all. Secrets never live in the
/// file: `SUPABASE_URL`, `SUPABASE_KEY` and `PORT` come from the
/// environment (a `.env` file is honored via `dotenv`).

use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::{ConfigError, StorageError};
use crate::storage::{BlobStore, LocalDirStore, SupabaseStore};
use crate::training::TrainingConfig;

pub const DEFAULT_CONFIG_PATH: &str = "flopred.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request worker threads.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000, workers: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    /// Blob store used when no Supabase credentials are configured.
    pub local_dir: String,
    #[serde(skip)]
    pub supabase_url: Option<String>,
    #[serde(skip)]
    pub supabase_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "data".to_string(),
            local_dir: "data/interim".to_string(),
            supabase_url: None,
            supabase_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub incidents_table: String,
    pub weather_table: String,
    /// Directory holding local copies of the raw tables.
    pub local_dir: String,
    /// IANA zone for naive timestamps and calendar features.
    pub timezone: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            incidents_table: "flooded_roads_phase1.csv".to_string(),
            weather_table: "weather_all_months_hourly.csv".to_string(),
            local_dir: "data/interim".to_string(),
            timezone: "Asia/Manila".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub nominatim_url: String,
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            nominatim_url: crate::geocode::DEFAULT_NOMINATIM_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub data: DataConfig,
    pub geocoding: GeocodingConfig,
    pub training: TrainingConfig,
}

impl ServiceConfig {
    /// Reads `path` (defaults when it does not exist), then overlays the
    /// process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents, path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path: path.display().to_string(), source }),
        }
    }

    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlays `SUPABASE_URL`, `SUPABASE_KEY` and `PORT` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("SUPABASE_URL") {
            self.storage.supabase_url = Some(url);
        }
        if let Some(key) = non_empty("SUPABASE_KEY") {
            self.storage.supabase_key = Some(key);
        }
        if let Some(port) = non_empty("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.data
            .timezone
            .parse()
            .map_err(|_| ConfigError::Timezone(self.data.timezone.clone()))
    }

    pub fn has_remote_storage(&self) -> bool {
        self.storage.supabase_url.is_some() && self.storage.supabase_key.is_some()
    }

    /// Supabase bucket when credentials are present, else the local directory.
    pub fn blob_store(&self) -> Result<Arc<dyn BlobStore>, StorageError> {
        match (&self.storage.supabase_url, &self.storage.supabase_key) {
            (Some(url), Some(key)) => Ok(Arc::new(SupabaseStore::new(url, key, &self.storage.bucket)?)),
            _ => Ok(Arc::new(LocalDirStore::new(&self.storage.local_dir))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServiceConfig::from_toml(
            "[server]\nport = 9000\n\n[training]\nforest_trees = 25\n",
            Path::new("flopred.toml"),
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.training.forest_trees, 25);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.data.incidents_table, "flooded_roads_phase1.csv");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let err = ServiceConfig::from_toml("[server\nport = ", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "secret"),
            ("PORT", "8081"),
        ]
        .into_iter()
        .collect();
        let mut config = ServiceConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert!(config.has_remote_storage());
        assert_eq!(config.server.port, 8081);
        assert!(config.blob_store().unwrap().describe().contains("Supabase"));
    }

    #[test]
    fn test_without_credentials_uses_local_store() {
        let mut config = ServiceConfig::default();
        config.apply_env(|k| if k == "SUPABASE_URL" { Some("  ".to_string()) } else { None });
        assert!(!config.has_remote_storage());
        assert!(config.blob_store().unwrap().describe().contains("data/interim"));
    }

    #[test]
    fn test_timezone() {
        assert_eq!(ServiceConfig::default().timezone().unwrap(), chrono_tz::Asia::Manila);
        let mut config = ServiceConfig::default();
        config.data.timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.timezone(), Err(ConfigError::Timezone(_))));
    }
}
