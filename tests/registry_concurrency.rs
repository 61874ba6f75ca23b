/// Concurrency tests for the model registry
///
/// These tests verify:
/// 1. Many threads hitting a cold registry trigger exactly one artifact load
/// 2. Readers never observe a half-swapped model while a retrain swaps it
///
/// Run with: cargo test --test registry_concurrency

mod common;

use common::{incidents_csv, settings, store_with, weather_csv};
use flopred_service::ingest::DataLoader;
use flopred_service::pipeline::run_pipeline;
use flopred_service::registry::ModelRegistry;
use flopred_service::storage::MemoryStore;
use flopred_service::training::{ARTIFACT_NAMES, TrainedModel};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn train_once() -> (Arc<MemoryStore>, TrainedModel) {
    let store = store_with(incidents_csv(48), weather_csv(48));
    let dir = tempfile::tempdir().unwrap();
    let loader = DataLoader::new(store.clone(), dir.path());
    let outcome = run_pipeline(&loader, store.as_ref(), &settings()).unwrap();
    (store, outcome.model)
}

/// Copies the published artifacts into a store with slow fetches.
fn slow_copy(source: &MemoryStore) -> Arc<MemoryStore> {
    let slow = Arc::new(MemoryStore::with_fetch_delay(Duration::from_millis(40)));
    for name in ARTIFACT_NAMES {
        slow.insert(name, source.get(name).unwrap());
    }
    slow
}

#[test]
fn test_cold_registry_loads_artifacts_once() {
    let (store, model) = train_once();
    let slow = slow_copy(&store);
    let registry = Arc::new(ModelRegistry::new(slow.clone()));

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.get().map(|m| m.version.clone())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some(model.version.as_str()));
    }
    for name in ARTIFACT_NAMES {
        assert_eq!(slow.fetch_count(name), 1, "{} fetched more than once", name);
    }
}

#[test]
fn test_unavailable_artifacts_are_not_cached() {
    let (store, model) = train_once();
    let slow = slow_copy(&store);
    slow.fail_fetches_of(ARTIFACT_NAMES[0]);
    let registry = ModelRegistry::new(slow.clone());

    assert!(registry.get().is_none());
    assert!(!registry.is_loaded());

    slow.clear_failures();
    assert_eq!(registry.get().unwrap().version, model.version);
}

#[test]
fn test_swap_during_reads_yields_old_or_new() {
    let (store, first) = train_once();
    let (_, second) = train_once();
    let (old, new) = (first.version.clone(), second.version.clone());
    assert_ne!(old, new);

    let registry = Arc::new(ModelRegistry::with_model(store, first));
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                (0..200)
                    .map(|_| registry.get().map(|m| m.version.clone()))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    registry.set(second);

    for reader in readers {
        for seen in reader.join().unwrap() {
            let seen = seen.unwrap();
            assert!(seen == old || seen == new, "unexpected version {}", seen);
        }
    }
    assert_eq!(registry.peek().unwrap().version, new);
}
