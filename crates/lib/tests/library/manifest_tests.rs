use std::fs;
use std::sync::Arc;
use std::thread;

use atomcss_lib::Context;
use atomcss_lib::manifest::{LoadStatus, ManifestStore, lock_path_for};

use super::common::{decls, temp_config};

#[test]
fn concurrent_writers_keep_every_definition() {
  let (_temp, config) = temp_config();
  let config = Arc::new(config);

  let handles: Vec<_> = (0..8)
    .map(|worker| {
      let config = Arc::clone(&config);
      thread::spawn(move || {
        let ctx = Context::new((*config).clone());
        for i in 0..5 {
          let name = format!("w{worker}_{i}");
          let width = format!("{}px", worker * 100 + i);
          ctx
            .define_class("app", &name, &decls(&[("width", width.as_str().into())]))
            .unwrap();
        }
      })
    })
    .collect();
  for handle in handles {
    handle.join().unwrap();
  }

  let store = ManifestStore::new(config.manifest_path.clone(), config.lock);
  let (manifest, status) = store.load_with_status().unwrap();
  assert_eq!(status, LoadStatus::Loaded);
  assert_eq!(manifest.classes.len(), 40);
  assert!(!lock_path_for(&config.manifest_path).exists());
}

#[test]
fn stale_lock_is_reclaimed_by_define() {
  let (_temp, mut config) = temp_config();
  config.lock.stale_ms = 50;
  let lock_path = lock_path_for(&config.manifest_path);
  fs::create_dir_all(&lock_path).unwrap();
  fs::write(
    lock_path.join("owner.json"),
    r#"{"version":1,"pid":1,"started_at_unix_ms":0,"command":"crashed build","manifest":"m.json"}"#,
  )
  .unwrap();

  let ctx = Context::new(config);
  ctx.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();

  assert!(!lock_path.exists());
  assert_eq!(ctx.lookup_class("app", "row").unwrap(), "x78zum5");
}

#[test]
fn outdated_manifest_is_rebuilt() {
  let (_temp, config) = temp_config();
  fs::write(&config.manifest_path, r#"{"version": 0, "classes": {"app.old": "whatever"}}"#).unwrap();

  let ctx = Context::new(config.clone());
  assert!(ctx.manifest().unwrap().is_empty());
  ctx.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();

  let store = ManifestStore::new(config.manifest_path.clone(), config.lock);
  let (manifest, status) = store.load_with_status().unwrap();
  assert_eq!(status, LoadStatus::Loaded);
  assert_eq!(manifest.classes.len(), 1);
}

#[test]
fn clear_is_visible_to_other_contexts() {
  let (_temp, config) = temp_config();
  let writer = Context::new(config.clone());
  writer.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();

  assert!(Context::new(config.clone()).clear().unwrap());
  assert!(writer.manifest().unwrap().is_empty());
  assert_eq!(writer.render().unwrap(), "");
}
