//! Manifest persistence.
//!
//! The manifest is one JSON file. Reads are lock-free: writes go to a temp
//! file in the same directory and are renamed into place, so a reader always
//! sees either the previous or the next complete manifest. Mutations run as
//! `lock → read → change → write if changed → unlock` cycles.

use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::{debug, warn};

use super::lock::{LockError, LockOptions, ManifestLock, lock_path_for};
use super::types::Manifest;
use crate::consts::{APP_NAME, MANIFEST_VERSION};

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write manifest {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error(transparent)]
  Lock(#[from] LockError),
}

/// What [`ManifestStore::load_with_status`] found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
  /// No manifest file yet.
  Missing,
  Loaded,
  /// Written by another schema version; discarded.
  VersionMismatch { found: u32 },
  /// Unparseable; discarded.
  Corrupt,
}

/// Where compiled artifacts are read from and written to.
pub trait ManifestBackend: Debug + Send + Sync {
  /// The last committed manifest.
  fn read(&self) -> Result<Manifest, ManifestError>;

  /// Apply `f` in a critical section; returns whether a write happened.
  fn update(&self, f: &mut dyn FnMut(&mut Manifest)) -> Result<bool, ManifestError>;

  /// Number of writes performed through this backend.
  fn writes(&self) -> u64;
}

/// Manifest file on disk, shared by every process pointed at the same path.
#[derive(Debug)]
pub struct ManifestStore {
  path: PathBuf,
  lock: LockOptions,
  command: String,
  writes: AtomicU64,
}

impl ManifestStore {
  pub fn new(path: impl Into<PathBuf>, lock: LockOptions) -> Self {
    Self {
      path: path.into(),
      lock,
      command: std::env::args().next().unwrap_or_else(|| APP_NAME.to_string()),
      writes: AtomicU64::new(0),
    }
  }

  /// Label recorded in lock metadata.
  pub fn with_command(mut self, command: impl Into<String>) -> Self {
    self.command = command.into();
    self
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn lock_path(&self) -> PathBuf {
    lock_path_for(&self.path)
  }

  pub fn lock_options(&self) -> &LockOptions {
    &self.lock
  }

  /// Load the manifest, recovering from version mismatches and corruption.
  pub fn load_with_status(&self) -> Result<(Manifest, LoadStatus), ManifestError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Manifest::new(), LoadStatus::Missing)),
      Err(source) => {
        return Err(ManifestError::Read {
          path: self.path.clone(),
          source,
        });
      }
    };

    let raw: serde_json::Value = match serde_json::from_str(&content) {
      Ok(raw) => raw,
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "manifest is corrupt, starting fresh");
        return Ok((Manifest::new(), LoadStatus::Corrupt));
      }
    };

    let found = raw.get("version").and_then(|v| v.as_u64());
    if let Some(found) = found
      && found != u64::from(MANIFEST_VERSION)
    {
      warn!(
        path = %self.path.display(),
        found,
        expected = MANIFEST_VERSION,
        "manifest version mismatch, starting fresh"
      );
      return Ok((
        Manifest::new(),
        LoadStatus::VersionMismatch {
          found: u32::try_from(found).unwrap_or(u32::MAX),
        },
      ));
    }

    match serde_json::from_value::<Manifest>(raw) {
      Ok(manifest) => Ok((manifest, LoadStatus::Loaded)),
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "manifest is corrupt, starting fresh");
        Ok((Manifest::new(), LoadStatus::Corrupt))
      }
    }
  }

  pub fn load(&self) -> Result<Manifest, ManifestError> {
    self.load_with_status().map(|(manifest, _)| manifest)
  }

  /// Write atomically. Callers mutating shared state should hold the lock.
  pub fn save(&self, manifest: &Manifest) -> Result<(), ManifestError> {
    let write_err = |source: io::Error| ManifestError::Write {
      path: self.path.clone(),
      source,
    };
    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(write_err)?;

    let content = serde_json::to_vec_pretty(manifest).map_err(ManifestError::Serialize)?;
    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    temp.write_all(&content).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(&self.path).map_err(|e| write_err(e.error))?;

    self.writes.fetch_add(1, Ordering::Relaxed);
    debug!(path = %self.path.display(), bytes = content.len(), "wrote manifest");
    Ok(())
  }

  /// Lock, read, apply `f`, write if the manifest changed, unlock.
  pub fn update(&self, f: &mut dyn FnMut(&mut Manifest)) -> Result<bool, ManifestError> {
    let _lock = ManifestLock::acquire(&self.path, &self.lock, &self.command)?;
    let (mut manifest, status) = self.load_with_status()?;
    let before = manifest.clone();
    f(&mut manifest);

    // a discarded manifest is rewritten even if nothing was added
    let recovered = matches!(status, LoadStatus::VersionMismatch { .. } | LoadStatus::Corrupt);
    if manifest == before && !recovered {
      return Ok(false);
    }
    self.save(&manifest)?;
    Ok(true)
  }

  /// Replace the manifest with an empty one.
  pub fn clear(&self) -> Result<(), ManifestError> {
    let _lock = ManifestLock::acquire(&self.path, &self.lock, &self.command)?;
    self.save(&Manifest::new())
  }
}

impl ManifestBackend for ManifestStore {
  fn read(&self) -> Result<Manifest, ManifestError> {
    self.load()
  }

  fn update(&self, f: &mut dyn FnMut(&mut Manifest)) -> Result<bool, ManifestError> {
    ManifestStore::update(self, f)
  }

  fn writes(&self) -> u64 {
    self.writes.load(Ordering::Relaxed)
  }
}

/// In-memory manifest used by forked contexts.
#[derive(Debug, Default)]
pub struct IsolatedManifest {
  manifest: Mutex<Manifest>,
  writes: AtomicU64,
}

impl IsolatedManifest {
  pub fn new(manifest: Manifest) -> Self {
    Self {
      manifest: Mutex::new(manifest),
      writes: AtomicU64::new(0),
    }
  }

  pub fn into_manifest(self) -> Manifest {
    self.manifest.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl ManifestBackend for IsolatedManifest {
  fn read(&self) -> Result<Manifest, ManifestError> {
    let guard = self.manifest.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(guard.clone())
  }

  fn update(&self, f: &mut dyn FnMut(&mut Manifest)) -> Result<bool, ManifestError> {
    let mut guard = self.manifest.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = guard.clone();
    f(&mut *guard);
    let changed = *guard != before;
    if changed {
      self.writes.fetch_add(1, Ordering::Relaxed);
    }
    Ok(changed)
  }

  fn writes(&self) -> u64 {
    self.writes.load(Ordering::Relaxed)
  }
}
