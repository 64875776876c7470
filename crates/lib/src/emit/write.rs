//! Writing the rendered stylesheet.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to write stylesheet {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
  Written,
  /// The file already held exactly this CSS.
  Unchanged,
}

/// Write `css` to `path` atomically unless the file already matches.
pub fn write_if_changed(path: &Path, css: &str) -> Result<WriteOutcome, EmitError> {
  if fs::read(path).is_ok_and(|existing| existing == css.as_bytes()) {
    debug!(path = %path.display(), "stylesheet unchanged");
    return Ok(WriteOutcome::Unchanged);
  }

  let write_err = |source: io::Error| EmitError::Write {
    path: path.to_path_buf(),
    source,
  };
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  };
  fs::create_dir_all(&dir).map_err(write_err)?;

  let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
  temp.write_all(css.as_bytes()).map_err(write_err)?;
  temp.persist(path).map_err(|e| write_err(e.error))?;
  debug!(path = %path.display(), bytes = css.len(), "wrote stylesheet");
  Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn second_identical_write_is_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("assets/app.css");
    assert_eq!(write_if_changed(&path, ".a{color:red}\n").unwrap(), WriteOutcome::Written);
    assert_eq!(write_if_changed(&path, ".a{color:red}\n").unwrap(), WriteOutcome::Unchanged);
    assert_eq!(write_if_changed(&path, ".a{color:blue}\n").unwrap(), WriteOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), ".a{color:blue}\n");
  }
}
