use atomcss_lib::Config;
use atomcss_lib::config::LayerMode;
use atomcss_lib::manifest::LockOptions;
use atomcss_lib::value::{Declarations, RawValue};
use tempfile::TempDir;

/// Config whose manifest and stylesheet live under a fresh temp directory.
pub fn temp_config() -> (TempDir, Config) {
  let temp = TempDir::new().unwrap();
  let config = Config {
    manifest_path: temp.path().join("manifest.json"),
    output_path: temp.path().join("atomcss.css"),
    layers: LayerMode::None,
    lock: LockOptions {
      retry_ms: 2,
      timeout_ms: 10_000,
      stale_ms: 60_000,
    },
    ..Config::default()
  };
  (temp, config)
}

pub fn decls(items: &[(&str, RawValue)]) -> Declarations {
  items.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}
