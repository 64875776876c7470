mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// atomcss - atomic CSS compiler build step
#[derive(Parser)]
#[command(name = "atomcss")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project directory holding atomcss.toml
  #[arg(short = 'C', long, global = true, default_value = ".")]
  dir: PathBuf,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Apply a registration plan and write the stylesheet
  Build {
    /// Path to the registration plan (JSON)
    plan: PathBuf,

    /// Clear the manifest before applying
    #[arg(long)]
    clean: bool,

    /// Only update the manifest; skip writing CSS
    #[arg(long)]
    no_emit: bool,
  },

  /// Render the manifest as CSS
  Render {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Show manifest contents and lock state
  Status {
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Remove every artifact from the manifest
  Clear,
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let dir = dunce::canonicalize(&cli.dir).unwrap_or(cli.dir);

  let result = match cli.command {
    Commands::Build { plan, clean, no_emit } => cmd::cmd_build(&dir, &plan, clean, no_emit),
    Commands::Render { output } => cmd::cmd_render(&dir, output.as_deref()),
    Commands::Status { format } => cmd::cmd_status(&dir, cli.verbose, format.is_json()),
    Commands::Clear => cmd::cmd_clear(&dir),
  };

  if let Err(err) = result {
    output::print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}
