/// Process-wide holder of the served model.
///
/// The cell starts empty and is filled lazily from the artifact store on
/// the first `get()`. Concurrent cold starts serialize on `load_guard` and
/// re-check the cell after acquiring it, so the store sees at most one
/// load per cold start. A failed load leaves the cell empty; the next
/// `get()` tries again.
///
/// `set()` swaps in a freshly trained model atomically; readers either see
/// the old `Arc` or the new one, never a mix.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{info, warn};

use crate::storage::BlobStore;
use crate::training::{TrainedModel, load_model};

pub struct ModelRegistry {
    store: Arc<dyn BlobStore>,
    cell: RwLock<Option<Arc<TrainedModel>>>,
    load_guard: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            cell: RwLock::new(None),
            load_guard: Mutex::new(()),
        }
    }

    /// Registry that starts out holding `model`.
    pub fn with_model(store: Arc<dyn BlobStore>, model: TrainedModel) -> Self {
        let registry = Self::new(store);
        registry.set(model);
        registry
    }

    /// The current model, loading it if the cell is empty.
    /// `None` means no model could be loaded right now.
    pub fn get(&self) -> Option<Arc<TrainedModel>> {
        if let Some(model) = self.peek() {
            return Some(model);
        }

        let _guard = lock(&self.load_guard);
        // another caller may have loaded while we waited
        if let Some(model) = self.peek() {
            return Some(model);
        }

        match load_model(self.store.as_ref()) {
            Ok(model) => {
                info!(version = %model.version, model = model.name(), "loaded model artifacts");
                let model = Arc::new(model);
                *write(&self.cell) = Some(model.clone());
                Some(model)
            }
            Err(e) => {
                warn!(error = %e, source = %self.store.describe(), "model unavailable");
                None
            }
        }
    }

    /// The current model without attempting a load.
    pub fn peek(&self) -> Option<Arc<TrainedModel>> {
        read(&self.cell).clone()
    }

    /// Installs `model`. Waits for an in-flight load so the stored model
    /// cannot overwrite it afterwards.
    pub fn set(&self, model: TrainedModel) {
        let version = model.version.clone();
        let _guard = lock(&self.load_guard);
        *write(&self.cell) = Some(Arc::new(model));
        info!(version = %version, "registry updated");
    }

    /// Drops the cached model; the next `get()` reloads from the store.
    pub fn invalidate(&self) {
        let _guard = lock(&self.load_guard);
        *write(&self.cell) = None;
    }

    pub fn is_loaded(&self) -> bool {
        read(&self.cell).is_some()
    }
}

fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
