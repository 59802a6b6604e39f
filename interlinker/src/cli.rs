use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for interlinker
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Interlinker: wikilinks, embeds and backlinks for markdown pages"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the interlinker CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new interlinker configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "interlinker.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Resolve every link and report dead links without writing pages.
  Check {
    /// Path to the directory containing markdown files.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,
  },

  /// Resolve every link and render each page to HTML.
  Build {
    /// Path to the directory containing markdown files.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for rendered pages.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of threads to use for rendering.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
