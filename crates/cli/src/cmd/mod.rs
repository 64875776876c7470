mod build;
mod clear;
mod render;
mod status;

pub use build::cmd_build;
pub use clear::cmd_clear;
pub use render::cmd_render;
pub use status::cmd_status;

use std::path::Path;

use anyhow::{Context as _, Result};
use atomcss_lib::Config;

/// Load `atomcss.toml` (or defaults) for the project in `dir`.
fn load_config(dir: &Path) -> Result<Config> {
  Config::discover(dir).with_context(|| format!("Failed to load config from {}", dir.display()))
}
