//! The artifact manifest: types, locking and storage.

mod lock;
mod store;
mod types;

pub use lock::{LockError, LockMetadata, LockOptions, ManifestLock, lock_path_for, read_metadata};
pub use store::{IsolatedManifest, LoadStatus, ManifestBackend, ManifestError, ManifestStore};
pub use types::*;
