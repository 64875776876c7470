//! Directory-based manifest locking.
//!
//! `mkdir` is atomic on every platform we care about, so the lock is a
//! directory next to the manifest (`<manifest>.lock`) holding an
//! `owner.json` with the holder's pid, start time and command.
//!
//! Staleness is a heuristic: a lock whose metadata (or, if the metadata was
//! never written, whose directory mtime) is older than the stale threshold
//! is assumed to belong to a crashed process and is removed. This gives
//! best-effort liveness after crashes, not a consensus protocol.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{DEFAULT_LOCK_RETRY_MS, DEFAULT_LOCK_STALE_MS, DEFAULT_LOCK_TIMEOUT_MS};

const LOCK_SUFFIX: &str = ".lock";
const OWNER_FILENAME: &str = "owner.json";
const LOCK_METADATA_VERSION: u32 = 1;

/// Lock timing, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
  pub retry_ms: u64,
  pub timeout_ms: u64,
  pub stale_ms: u64,
}

impl Default for LockOptions {
  fn default() -> Self {
    Self {
      retry_ms: DEFAULT_LOCK_RETRY_MS,
      timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
      stale_ms: DEFAULT_LOCK_STALE_MS,
    }
  }
}

impl LockOptions {
  pub fn retry(&self) -> Duration {
    Duration::from_millis(self.retry_ms.max(1))
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }

  pub fn stale(&self) -> Duration {
    Duration::from_millis(self.stale_ms)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
  pub version: u32,
  pub pid: u32,
  pub started_at_unix_ms: u64,
  pub command: String,
  pub manifest: PathBuf,
}

#[derive(Debug, Error)]
pub enum LockError {
  #[error(
    "timed out after {waited_ms}ms waiting for the manifest lock held by {holder}\n\
     If you're sure no atomcss process is running, remove the lock directory:\n  {}",
    .lock_path.display()
  )]
  Timeout {
    lock_path: PathBuf,
    holder: String,
    waited_ms: u64,
  },

  #[error("failed to create lock directory {}: {source}", .lock_path.display())]
  Create {
    lock_path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write lock metadata: {0}")]
  WriteMetadata(#[source] io::Error),
}

/// Held manifest lock; released on drop.
#[derive(Debug)]
pub struct ManifestLock {
  lock_path: PathBuf,
}

fn now_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as u64
}

/// Lock directory path for a manifest file.
pub fn lock_path_for(manifest: &Path) -> PathBuf {
  let mut name = manifest.as_os_str().to_owned();
  name.push(LOCK_SUFFIX);
  PathBuf::from(name)
}

pub fn read_metadata(lock_path: &Path) -> Option<LockMetadata> {
  let contents = fs::read_to_string(lock_path.join(OWNER_FILENAME)).ok()?;
  serde_json::from_str(&contents).ok()
}

/// Age of an existing lock, from its metadata or directory mtime.
fn lock_age(lock_path: &Path, metadata: Option<&LockMetadata>) -> Option<Duration> {
  if let Some(metadata) = metadata {
    return Some(Duration::from_millis(now_ms().saturating_sub(metadata.started_at_unix_ms)));
  }
  let modified = fs::metadata(lock_path).and_then(|m| m.modified()).ok()?;
  Some(SystemTime::now().duration_since(modified).unwrap_or_default())
}

static TOMBSTONES: AtomicU64 = AtomicU64::new(0);

/// Move a stale lock aside, then delete it.
///
/// The rename is atomic, so only one waiter gets to move a given directory.
/// If what was moved is not the lock judged stale (a new owner took the lock
/// in between), it is moved back and `false` is returned.
fn reclaim_stale(lock_path: &Path, judged: Option<&LockMetadata>) -> bool {
  let mut name = lock_path.as_os_str().to_owned();
  name.push(format!(
    ".stale-{}-{}",
    std::process::id(),
    TOMBSTONES.fetch_add(1, Ordering::Relaxed)
  ));
  let tombstone = PathBuf::from(name);

  if let Err(e) = fs::rename(lock_path, &tombstone) {
    debug!(lock = %lock_path.display(), error = %e, "stale lock already moved");
    return false;
  }
  if read_metadata(&tombstone).as_ref() != judged {
    debug!(lock = %lock_path.display(), "lock changed owner before reclaim, restoring");
    if let Err(e) = fs::rename(&tombstone, lock_path) {
      warn!(lock = %lock_path.display(), error = %e, "failed to restore live lock");
    }
    return false;
  }
  if let Err(e) = fs::remove_dir_all(&tombstone) {
    debug!(tombstone = %tombstone.display(), error = %e, "failed to remove stale lock");
  }
  true
}

fn describe_holder(lock_path: &Path) -> String {
  match read_metadata(lock_path) {
    Some(metadata) => format!(
      "`{}` (PID {}, started at unix ms {})",
      metadata.command, metadata.pid, metadata.started_at_unix_ms
    ),
    None => "an unknown process".to_string(),
  }
}

impl ManifestLock {
  /// Acquire the lock for `manifest`, blocking until it is free, stale, or
  /// the timeout elapses.
  pub fn acquire(manifest: &Path, options: &LockOptions, command: &str) -> Result<Self, LockError> {
    let lock_path = lock_path_for(manifest);
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|source| LockError::Create {
        lock_path: lock_path.clone(),
        source,
      })?;
    }

    let started = std::time::Instant::now();
    loop {
      match fs::create_dir(&lock_path) {
        Ok(()) => {
          let lock = ManifestLock { lock_path };
          lock.write_metadata(manifest, command)?;
          debug!(lock = %lock.lock_path.display(), waited_ms = started.elapsed().as_millis() as u64, "acquired manifest lock");
          return Ok(lock);
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(source) => return Err(LockError::Create { lock_path, source }),
      }

      let holder = read_metadata(&lock_path);
      if let Some(age) = lock_age(&lock_path, holder.as_ref())
        && age > options.stale()
      {
        warn!(
          lock = %lock_path.display(),
          age_ms = age.as_millis() as u64,
          holder = %describe_holder(&lock_path),
          "removing stale manifest lock"
        );
        if reclaim_stale(&lock_path, holder.as_ref()) {
          continue;
        }
      }

      if started.elapsed() >= options.timeout() {
        return Err(LockError::Timeout {
          holder: describe_holder(&lock_path),
          waited_ms: started.elapsed().as_millis() as u64,
          lock_path,
        });
      }
      thread::sleep(options.retry());
    }
  }

  fn write_metadata(&self, manifest: &Path, command: &str) -> Result<(), LockError> {
    let metadata = LockMetadata {
      version: LOCK_METADATA_VERSION,
      pid: std::process::id(),
      started_at_unix_ms: now_ms(),
      command: command.to_string(),
      manifest: manifest.to_path_buf(),
    };
    let content = serde_json::to_string_pretty(&metadata).map_err(|e| LockError::WriteMetadata(io::Error::other(e)))?;
    fs::write(self.lock_path.join(OWNER_FILENAME), content).map_err(LockError::WriteMetadata)
  }

  pub fn lock_path(&self) -> &Path {
    &self.lock_path
  }

  pub fn metadata(&self) -> Option<LockMetadata> {
    read_metadata(&self.lock_path)
  }
}

impl Drop for ManifestLock {
  fn drop(&mut self) {
    match fs::remove_dir_all(&self.lock_path) {
      Ok(()) => debug!(lock = %self.lock_path.display(), "released manifest lock"),
      Err(e) => debug!(lock = %self.lock_path.display(), error = %e, "failed to release manifest lock"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn fast() -> LockOptions {
    LockOptions {
      retry_ms: 5,
      timeout_ms: 100,
      stale_ms: 60_000,
    }
  }

  #[test]
  fn lock_path_appends_suffix() {
    assert_eq!(lock_path_for(Path::new("/a/manifest.json")), PathBuf::from("/a/manifest.json.lock"));
  }

  #[test]
  fn metadata_is_written() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("manifest.json");
    let lock = ManifestLock::acquire(&manifest, &fast(), "my-command").unwrap();
    let metadata = lock.metadata().unwrap();
    assert_eq!(metadata.version, 1);
    assert_eq!(metadata.command, "my-command");
    assert_eq!(metadata.pid, std::process::id());
    assert!(lock.lock_path().is_dir());
  }

  #[test]
  fn released_on_drop() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("manifest.json");
    let path = {
      let lock = ManifestLock::acquire(&manifest, &fast(), "first").unwrap();
      lock.lock_path().to_path_buf()
    };
    assert!(!path.exists());
    ManifestLock::acquire(&manifest, &fast(), "second").unwrap();
  }

  #[test]
  fn contention_times_out_with_lock_path() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("manifest.json");
    let _held = ManifestLock::acquire(&manifest, &fast(), "holder").unwrap();

    let err = ManifestLock::acquire(&manifest, &fast(), "waiter").unwrap_err();
    match err {
      LockError::Timeout { lock_path, holder, .. } => {
        assert_eq!(lock_path, lock_path_for(&manifest));
        assert!(holder.contains("holder"), "{holder}");
      }
      other => panic!("expected timeout, got {other}"),
    }
  }

  #[test]
  fn stale_lock_is_reclaimed() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("manifest.json");
    let lock_path = lock_path_for(&manifest);
    fs::create_dir_all(&lock_path).unwrap();
    let metadata = LockMetadata {
      version: 1,
      pid: 0,
      started_at_unix_ms: now_ms() - 120_000,
      command: "crashed".to_string(),
      manifest: manifest.clone(),
    };
    fs::write(lock_path.join(OWNER_FILENAME), serde_json::to_string(&metadata).unwrap()).unwrap();

    let lock = ManifestLock::acquire(&manifest, &fast(), "fresh").unwrap();
    assert_eq!(lock.metadata().unwrap().command, "fresh");
  }

  fn write_owner(lock_path: &Path, command: &str, started_at_unix_ms: u64) -> LockMetadata {
    fs::create_dir_all(lock_path).unwrap();
    let metadata = LockMetadata {
      version: 1,
      pid: 0,
      started_at_unix_ms,
      command: command.to_string(),
      manifest: PathBuf::from("manifest.json"),
    };
    fs::write(lock_path.join(OWNER_FILENAME), serde_json::to_string(&metadata).unwrap()).unwrap();
    metadata
  }

  fn leftover_tombstones(dir: &Path) -> usize {
    fs::read_dir(dir)
      .unwrap()
      .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().contains(".stale-"))
      .count()
  }

  #[test]
  fn reclaim_leaves_a_lock_that_changed_owner() {
    let temp = TempDir::new().unwrap();
    let lock_path = lock_path_for(&temp.path().join("manifest.json"));
    let judged = write_owner(&lock_path, "crashed", 0);
    fs::remove_dir_all(&lock_path).unwrap();
    write_owner(&lock_path, "live", now_ms());

    assert!(!reclaim_stale(&lock_path, Some(&judged)));
    assert_eq!(read_metadata(&lock_path).unwrap().command, "live");
    assert_eq!(leftover_tombstones(temp.path()), 0);
  }

  #[test]
  fn reclaim_removes_the_judged_lock() {
    let temp = TempDir::new().unwrap();
    let lock_path = lock_path_for(&temp.path().join("manifest.json"));
    let judged = write_owner(&lock_path, "crashed", 0);

    assert!(reclaim_stale(&lock_path, Some(&judged)));
    assert!(!lock_path.exists());
    assert_eq!(leftover_tombstones(temp.path()), 0);
  }

  #[test]
  fn waiters_on_a_stale_lock_hold_it_one_at_a_time() {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("manifest.json");
    write_owner(&lock_path_for(&manifest), "crashed", 0);

    let options = LockOptions {
      retry_ms: 1,
      timeout_ms: 10_000,
      stale_ms: 60_000,
    };
    let holders = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(std::sync::Barrier::new(16));
    let handles: Vec<_> = (0..16)
      .map(|_| {
        let (manifest, holders, barrier) = (manifest.clone(), Arc::clone(&holders), Arc::clone(&barrier));
        thread::spawn(move || {
          barrier.wait();
          let _lock = ManifestLock::acquire(&manifest, &options, "worker").unwrap();
          assert_eq!(holders.fetch_add(1, Ordering::SeqCst), 0);
          thread::sleep(Duration::from_millis(2));
          holders.fetch_sub(1, Ordering::SeqCst);
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }
    assert!(!lock_path_for(&manifest).exists());
  }

  #[test]
  fn lock_without_metadata_uses_directory_age() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("manifest.json");
    fs::create_dir_all(lock_path_for(&manifest)).unwrap();

    let options = LockOptions {
      retry_ms: 5,
      timeout_ms: 2_000,
      stale_ms: 20,
    };
    ManifestLock::acquire(&manifest, &options, "fresh").unwrap();
  }
}
