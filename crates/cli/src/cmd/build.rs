//! Implementation of the `atomcss build` command.
//!
//! Applies a registration plan against the project manifest, then renders the
//! whole manifest and writes the stylesheet when its content changed.

use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::info;

use atomcss_lib::Context;
use atomcss_lib::emit::{WriteOutcome, write_if_changed};
use atomcss_lib::registration::BuildPlan;

use crate::output::{print_info, print_stat, print_success};

pub fn cmd_build(dir: &Path, plan_path: &Path, clean: bool, no_emit: bool) -> Result<()> {
  let config = super::load_config(dir)?;
  let plan = BuildPlan::load(plan_path).with_context(|| format!("Failed to load plan: {}", plan_path.display()))?;

  let ctx = Context::new(config);
  if clean {
    ctx.clear().context("Failed to clear manifest")?;
    print_info("Cleared manifest");
  }

  let report = plan.apply(&ctx).context("Build failed")?;

  print_success("Build complete");
  print_stat("Defined", &report.defined.len().to_string());
  print_stat("Manifest writes", &report.writes.to_string());
  print_stat("Manifest", &ctx.config().manifest_path.display().to_string());

  if no_emit {
    return Ok(());
  }

  let css = ctx.render().context("Failed to read manifest")?;
  let output_path = &ctx.config().output_path;
  let outcome = write_if_changed(output_path, &css)?;
  let state = match outcome {
    WriteOutcome::Written => "written",
    WriteOutcome::Unchanged => "unchanged",
  };
  info!(path = %output_path.display(), state, bytes = css.len(), "stylesheet");
  print_stat("Stylesheet", &format!("{} ({})", output_path.display(), state));

  Ok(())
}
