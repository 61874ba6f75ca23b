/// Blob storage capability used for both raw data tables and model artifacts.
///
/// The service only ever needs two operations on its object store: fetch an
/// object's bytes by name and write (overwrite) an object by name. Keeping
/// that behind a trait lets serving, training and tests share one seam:
///
/// - `supabase` - Supabase Storage REST API (production bucket)
/// - `local`    - a directory on disk (offline mode, local artifact copies)
/// - `memory`   - in-process map with fetch counters (tests, dry runs)

pub mod local;
pub mod memory;
pub mod supabase;

pub use local::LocalDirStore;
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use crate::error::StorageError;

/// Named-object store.
///
/// `put` must be all-or-nothing for a single object: on error, readers see
/// either the previous bytes or nothing, never a truncated object.
pub trait BlobStore: Send + Sync {
    /// Short human-readable description used in log lines.
    fn describe(&self) -> String;

    fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;
}
