/// Directory-backed blob store.
///
/// Object names map to file names directly under the root directory.
/// Writes go to a sibling temp file first and are renamed into place, so a
/// failed write never leaves a truncated artifact behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::BlobStore;
use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl BlobStore for LocalDirStore {
    fn describe(&self) -> String {
        format!("local directory {}", self.root.display())
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.path_for(name)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::Io(e),
        })
    }

    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let target = self.path_for(name);
        let staging = self.path_for(&format!(".{}.tmp", name));
        fs::write(&staging, bytes)?;

        if let Err(e) = fs::rename(&staging, &target) {
            let _ = fs::remove_file(&staging);
            return Err(StorageError::Io(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_fetch_returns_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(dir.path());

        store.put("flood_model_scaler.pkl", b"{\"mean\":[]}").unwrap();
        let bytes = store.fetch("flood_model_scaler.pkl").unwrap();
        assert_eq!(bytes, b"{\"mean\":[]}");
    }

    #[test]
    fn test_put_overwrites_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(dir.path());

        store.put("a.csv", b"old").unwrap();
        store.put("a.csv", b"new").unwrap();

        assert_eq!(store.fetch("a.csv").unwrap(), b"new");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv".to_string()]);
    }

    #[test]
    fn test_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(dir.path());

        match store.fetch("missing.csv") {
            Err(StorageError::NotFound(name)) => assert_eq!(name, "missing.csv"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_put_creates_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(dir.path().join("artifacts"));

        store.put("x.pkl", b"1").unwrap();
        assert!(store.root().join("x.pkl").exists());
    }
}
