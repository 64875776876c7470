use std::path::Path;

use anyhow::{Context as _, Result};

use atomcss_lib::Context;

use crate::output::{print_info, print_success};

pub fn cmd_clear(dir: &Path) -> Result<()> {
  let ctx = Context::new(super::load_config(dir)?);
  let path = ctx.config().manifest_path.display().to_string();
  if ctx.clear().context("Failed to clear manifest")? {
    print_success(&format!("Cleared {path}"));
  } else {
    print_info(&format!("{path} is already empty"));
  }
  Ok(())
}
