//! Status command implementation.
//!
//! Displays what the manifest holds, whether it loaded cleanly, and who holds
//! the manifest lock if anyone does.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context as _, Result};

use atomcss_lib::manifest::{LoadStatus, ManifestStore, read_metadata};

use crate::output::{self, format_age, format_bytes, print_info, print_json, print_stat, print_success, print_warning};

pub fn cmd_status(dir: &Path, verbose: bool, json: bool) -> Result<()> {
  let config = super::load_config(dir)?;
  let store = ManifestStore::new(config.manifest_path.clone(), config.lock);

  let (manifest, status) = store
    .load_with_status()
    .with_context(|| format!("Failed to read manifest: {}", store.path().display()))?;
  let stats = manifest.stats();
  let size = std::fs::metadata(store.path()).map(|m| m.len()).unwrap_or(0);
  let lock = read_metadata(&store.lock_path());

  if json {
    let json_output = serde_json::json!({
      "manifest": store.path(),
      "status": status_label(status),
      "version": manifest.version,
      "size_bytes": size,
      "stats": stats,
      "lock": lock,
    });
    return print_json(&json_output);
  }

  match status {
    LoadStatus::Missing => {
      print_info(&format!("No manifest at {}. Run 'atomcss build' to create one.", store.path().display()));
      return Ok(());
    }
    LoadStatus::Loaded => print_success(&format!("Manifest: {}", store.path().display())),
    LoadStatus::VersionMismatch { found } => print_warning(&format!(
      "Manifest {} has schema version {found}; it will be rebuilt on the next build",
      store.path().display()
    )),
    LoadStatus::Corrupt => print_warning(&format!(
      "Manifest {} is unreadable; it will be rebuilt on the next build",
      store.path().display()
    )),
  }

  print_stat("Size", &format_bytes(size));
  println!();
  print_stat("Classes", &format!("{} ({} rules)", stats.classes, stats.rules));
  print_stat("Variables", &stats.vars.to_string());
  print_stat("Constants", &stats.consts.to_string());
  print_stat("Keyframes", &stats.keyframes.to_string());
  print_stat("Themes", &stats.themes.to_string());
  print_stat("Position tries", &stats.position_tries.to_string());
  print_stat("View transitions", &stats.view_transitions.to_string());
  print_stat("Markers", &stats.markers.to_string());

  if verbose && !manifest.classes.is_empty() {
    println!();
    println!("Classes:");
    for (key, class) in &manifest.classes {
      println!("  {} {} {}", output::symbols::INFO, key, class.class_string());
    }
  }

  if let Some(lock) = lock {
    let now = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_millis() as u64)
      .unwrap_or(0);
    println!();
    print_warning(&format!(
      "Locked by pid {} ({}) for {}",
      lock.pid,
      lock.command,
      format_age(now.saturating_sub(lock.started_at_unix_ms))
    ));
  }

  Ok(())
}

fn status_label(status: LoadStatus) -> &'static str {
  match status {
    LoadStatus::Missing => "missing",
    LoadStatus::Loaded => "loaded",
    LoadStatus::VersionMismatch { .. } => "version_mismatch",
    LoadStatus::Corrupt => "corrupt",
  }
}
