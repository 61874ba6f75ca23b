/// In-memory blob store.
///
/// Used by tests and dry runs. Counts fetches per object name so callers
/// can assert how many remote round-trips a code path made, and can be
/// told to fail a specific `put` to exercise partial-upload handling.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::BlobStore;
use crate::error::StorageError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fetch_counts: Mutex<HashMap<String, usize>>,
    total_fetches: AtomicUsize,
    failing_puts: Mutex<HashSet<String>>,
    failing_fetches: Mutex<HashSet<String>>,
    fetch_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that sleeps on every fetch, to widen race windows in tests.
    pub fn with_fetch_delay(delay: Duration) -> Self {
        Self { fetch_delay: Some(delay), ..Self::default() }
    }

    pub fn insert(&self, name: &str, bytes: impl Into<Vec<u8>>) {
        lock(&self.objects).insert(name.to_string(), bytes.into());
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.objects).get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.objects).contains_key(name)
    }

    /// Number of `fetch` calls made for `name`, successful or not.
    pub fn fetch_count(&self, name: &str) -> usize {
        lock(&self.fetch_counts).get(name).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }

    /// Makes every subsequent `put` of `name` fail.
    pub fn fail_puts_of(&self, name: &str) {
        lock(&self.failing_puts).insert(name.to_string());
    }

    /// Makes every subsequent `fetch` of `name` fail.
    pub fn fail_fetches_of(&self, name: &str) {
        lock(&self.failing_fetches).insert(name.to_string());
    }

    pub fn clear_failures(&self) {
        lock(&self.failing_puts).clear();
        lock(&self.failing_fetches).clear();
    }
}

impl BlobStore for MemoryStore {
    fn describe(&self) -> String {
        "in-memory store".to_string()
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        *lock(&self.fetch_counts).entry(name.to_string()).or_insert(0) += 1;

        if let Some(delay) = self.fetch_delay {
            std::thread::sleep(delay);
        }
        if lock(&self.failing_fetches).contains(name) {
            return Err(StorageError::Injected(name.to_string()));
        }

        self.get(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if lock(&self.failing_puts).contains(name) {
            return Err(StorageError::Injected(name.to_string()));
        }
        self.insert(name, bytes.to_vec());
        Ok(())
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
