//! Compiler configuration.
//!
//! Loaded from `atomcss.toml` in the project root when present; every field
//! has a default. `ATOMCSS_MANIFEST` and `ATOMCSS_OUTPUT` override the file
//! locations so parallel build workers can share a manifest without editing
//! the config.
//!
//! ```toml
//! class_prefix = "x"
//! root_font_size = 16
//! layers = "per-priority"
//! shorthands = "keep-with-resets"
//!
//! [validation]
//! unknown_property = "error"
//!
//! [lock]
//! timeout_ms = 10000
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{CONFIG_FILENAME, DEFAULT_CLASS_PREFIX, DEFAULT_MANIFEST_PATH, DEFAULT_OUTPUT_PATH, MANIFEST_ENV, OUTPUT_ENV};
use crate::manifest::LockOptions;
use crate::validate::ValidationConfig;

/// How atomic rules are wrapped in cascade layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerMode {
  /// One `@layer priorityN` per priority band.
  #[default]
  PerPriority,
  /// Everything in `@layer atoms`.
  Single,
  /// No layers; selectors use the `:not(#\#)` bump instead.
  None,
}

impl LayerMode {
  pub fn uses_layers(&self) -> bool {
    !matches!(self, LayerMode::None)
  }
}

/// Which shorthand strategy a context uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShorthandMode {
  #[default]
  KeepWithResets,
  Flatten,
  Forbid,
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid config {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Prefix for every generated class, variable and keyframes name.
  pub class_prefix: String,
  /// Root font size in px; enables `font-size` px → rem conversion.
  pub root_font_size: Option<f64>,
  pub layers: LayerMode,
  pub shorthands: ShorthandMode,
  /// Used by the `forbid` strategy; empty means every known shorthand.
  pub disallowed_shorthands: Vec<String>,
  pub validation: ValidationConfig,
  pub manifest_path: PathBuf,
  pub output_path: PathBuf,
  pub lock: LockOptions,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
      root_font_size: None,
      layers: LayerMode::default(),
      shorthands: ShorthandMode::default(),
      disallowed_shorthands: Vec::new(),
      validation: ValidationConfig::default(),
      manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
      output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
      lock: LockOptions::default(),
    }
  }
}

impl Config {
  /// Parse a config file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load `atomcss.toml` from `dir` if it exists, then apply env overrides.
  ///
  /// Relative paths in the result are resolved against `dir`.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    let config = if path.is_file() {
      debug!(path = %path.display(), "loading config");
      Self::load(&path)?
    } else {
      debug!(dir = %dir.display(), "no config file, using defaults");
      Self::default()
    };
    Ok(config.with_env_overrides().relative_to(dir))
  }

  /// Apply `ATOMCSS_MANIFEST` / `ATOMCSS_OUTPUT`.
  pub fn with_env_overrides(mut self) -> Self {
    if let Some(path) = std::env::var_os(MANIFEST_ENV).filter(|v| !v.is_empty()) {
      self.manifest_path = PathBuf::from(path);
    }
    if let Some(path) = std::env::var_os(OUTPUT_ENV).filter(|v| !v.is_empty()) {
      self.output_path = PathBuf::from(path);
    }
    self
  }

  fn relative_to(mut self, dir: &Path) -> Self {
    if self.manifest_path.is_relative() {
      self.manifest_path = dir.join(&self.manifest_path);
    }
    if self.output_path.is_relative() {
      self.output_path = dir.join(&self.output_path);
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validate::Level;
  use serial_test::serial;
  use tempfile::TempDir;

  #[test]
  fn empty_file_is_all_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
  }

  #[test]
  fn fields_parse_from_toml() {
    let config: Config = toml::from_str(
      r#"
class_prefix = "s"
root_font_size = 16
layers = "none"
shorthands = "forbid"
disallowed_shorthands = ["margin"]

[validation]
unknown_property = "error"

[lock]
timeout_ms = 500
"#,
    )
    .unwrap();
    assert_eq!(config.class_prefix, "s");
    assert_eq!(config.root_font_size, Some(16.0));
    assert_eq!(config.layers, LayerMode::None);
    assert_eq!(config.shorthands, ShorthandMode::Forbid);
    assert_eq!(config.validation.unknown_property, Level::Error);
    assert_eq!(config.validation.deprecated, Level::Warn);
    assert_eq!(config.lock.timeout_ms, 500);
    assert_eq!(config.lock.retry_ms, 10);
  }

  #[test]
  fn unknown_layer_mode_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_FILENAME);
    std::fs::write(&path, "layers = \"sometimes\"").unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
  }

  #[test]
  #[serial]
  fn discover_without_file_uses_defaults_under_dir() {
    let temp = TempDir::new().unwrap();
    temp_env::with_vars_unset([MANIFEST_ENV, OUTPUT_ENV], || {
      let config = Config::discover(temp.path()).unwrap();
      assert_eq!(config.manifest_path, temp.path().join(DEFAULT_MANIFEST_PATH));
      assert_eq!(config.output_path, temp.path().join(DEFAULT_OUTPUT_PATH));
    });
  }

  #[test]
  #[serial]
  fn env_overrides_paths() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILENAME), "manifest_path = \"from-file.json\"").unwrap();
    temp_env::with_vars(
      [(MANIFEST_ENV, Some("/tmp/shared.json")), (OUTPUT_ENV, None::<&str>)],
      || {
        let config = Config::discover(temp.path()).unwrap();
        assert_eq!(config.manifest_path, PathBuf::from("/tmp/shared.json"));
        assert_eq!(config.output_path, temp.path().join(DEFAULT_OUTPUT_PATH));
      },
    );
  }

  #[test]
  #[serial]
  fn file_paths_are_relative_to_dir() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILENAME), "output_path = \"out/app.css\"").unwrap();
    temp_env::with_vars_unset([MANIFEST_ENV, OUTPUT_ENV], || {
      let config = Config::discover(temp.path()).unwrap();
      assert_eq!(config.output_path, temp.path().join("out/app.css"));
    });
  }
}
