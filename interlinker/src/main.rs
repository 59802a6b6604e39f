use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use interlinker::{
  cli::{Cli, Commands},
  utils,
};
use interlinker_config::Config;
use log::{LevelFilter, info};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    if output.exists() && !force {
      bail!(
        "Configuration file already exists: {}. Use --force to overwrite.",
        output.display()
      );
    }

    if let Some(parent) = output.parent()
      && !parent.as_os_str().is_empty()
      && !parent.exists()
    {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }

    Config::generate_default_config(format, output).wrap_err_with(|| {
      format!(
        "Failed to generate configuration file: {}",
        output.display()
      )
    })?;
    return Ok(());
  }

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;

  match cli.command {
    Commands::Check { input_dir } => {
      if input_dir.is_some() {
        config.input_dir = input_dir;
      }
      utils::check(&config)
    },
    Commands::Build {
      input_dir,
      output_dir,
      jobs,
    } => {
      if input_dir.is_some() {
        config.input_dir = input_dir;
      }
      if let Some(output_dir) = output_dir {
        config.output_dir = output_dir;
      }
      if jobs.is_some() {
        config.jobs = jobs;
      }
      utils::build(&config)
    },
    Commands::Init { .. } => Ok(()),
  }
}
