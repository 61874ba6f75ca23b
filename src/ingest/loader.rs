/// Raw table loader with local fallback.
///
/// Order of preference for a table named `name`:
///   1. the remote blob store
///   2. `<local_dir>/<name>` on disk
///   3. an empty `Table`
/// Each step down is logged. There are no retries beyond the one fallback;
/// an empty result is for the caller to interpret (empty severity index
/// when serving, `DataUnavailable` when retraining).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono_tz::Tz;
use tracing::{info, warn};

use super::records::{incidents_from_table, observations_from_table};
use super::table::Table;
use crate::error::{DataError, StorageError};
use crate::model::{FloodIncident, WeatherObservation};
use crate::storage::BlobStore;

pub struct DataLoader {
    store: Arc<dyn BlobStore>,
    local_dir: PathBuf,
}

impl DataLoader {
    pub fn new(store: Arc<dyn BlobStore>, local_dir: impl Into<PathBuf>) -> Self {
        Self { store, local_dir: local_dir.into() }
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Loads `name`, falling back to the local copy and then to an empty table.
    pub fn load(&self, name: &str) -> Table {
        match self.load_remote(name) {
            Ok(table) => {
                info!(table = name, rows = table.len(), source = %self.store.describe(), "loaded table");
                return table;
            }
            Err(e) => warn!(table = name, error = %e, "remote load failed, trying local copy"),
        }

        let path = self.local_dir.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => match Table::from_csv_bytes(&bytes) {
                Ok(table) => {
                    info!(table = name, rows = table.len(), path = %path.display(), "loaded local copy");
                    return table;
                }
                Err(e) => warn!(table = name, error = %e, "local copy is not valid CSV"),
            },
            Err(e) => warn!(table = name, path = %path.display(), error = %e, "no local copy"),
        }

        warn!(table = name, "no data available, using empty table");
        Table::empty()
    }

    fn load_remote(&self, name: &str) -> Result<Table, LoadFailure> {
        let bytes = self.store.fetch(name).map_err(LoadFailure::Storage)?;
        Table::from_csv_bytes(&bytes).map_err(LoadFailure::Data)
    }

    /// Loads and adapts the incident table. Empty means `DataUnavailable`.
    pub fn load_incidents(&self, name: &str, tz: Tz) -> Result<Vec<FloodIncident>, DataError> {
        let table = self.load(name);
        if table.is_empty() {
            return Err(DataError::DataUnavailable(name.to_string()));
        }
        incidents_from_table(&table, name, tz)
    }

    /// Loads and adapts the weather table. Empty means `DataUnavailable`.
    pub fn load_weather(&self, name: &str, tz: Tz) -> Result<Vec<WeatherObservation>, DataError> {
        let table = self.load(name);
        if table.is_empty() {
            return Err(DataError::DataUnavailable(name.to_string()));
        }
        observations_from_table(&table, name, tz)
    }
}

#[derive(Debug)]
enum LoadFailure {
    Storage(StorageError),
    Data(DataError),
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::Storage(e) => write!(f, "{}", e),
            LoadFailure::Data(e) => write!(f, "{}", e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
