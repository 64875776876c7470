//! Implementation of the `atomcss render` command.

use std::path::Path;

use anyhow::{Context as _, Result};

use atomcss_lib::Context;
use atomcss_lib::emit::write_if_changed;

use crate::output::print_success;

pub fn cmd_render(dir: &Path, output: Option<&Path>) -> Result<()> {
  let ctx = Context::new(super::load_config(dir)?);
  let css = ctx.render().context("Failed to read manifest")?;

  match output {
    Some(path) => {
      write_if_changed(path, &css)?;
      print_success(&format!("Wrote {}", path.display()));
    }
    None => print!("{css}"),
  }
  Ok(())
}
