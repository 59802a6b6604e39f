pub mod output;
pub mod pages;

use std::{fs, path::Path, sync::Arc};

use color_eyre::eyre::{Context, Result, eyre};
use futures::future::try_join_all;
use interlinker_config::Config;
use interlinker_core::{Interlinker, PageDirectory, TeraRenderer};
use log::info;

/// A loaded set of pages and the engine resolving links between them.
#[derive(Debug)]
pub struct Site {
  pub interlinker: Interlinker,
  pub directory:   PageDirectory,
}

impl Site {
  /// Load every page under the configured input directory and prepare the
  /// link engine.
  ///
  /// # Errors
  ///
  /// Returns an error if no input directory is configured, pages fail to
  /// load, or the layouts directory holds an invalid template.
  pub fn load(config: &Config) -> Result<Self> {
    let input_dir = config
      .input_dir
      .as_deref()
      .ok_or_else(|| {
        eyre!("No input directory configured. Pass --input-dir or set input_dir")
      })?;

    let interlinker = Interlinker::new(config.interlinker_options().build());
    let renderer = match &config.layouts_dir {
      Some(dir) => {
        TeraRenderer::from_dir(dir).wrap_err_with(|| {
          format!("Failed to load layouts from {}", dir.display())
        })?
      },
      None => TeraRenderer::new(),
    };
    interlinker.on_config(Arc::new(renderer));

    let directory = pages::load_pages(input_dir)?.into_iter().collect();
    Ok(Self {
      interlinker,
      directory,
    })
  }

  /// Resolve the outbound links of every page, filling in backlinks.
  ///
  /// Returns the total number of outbound links.
  ///
  /// # Errors
  ///
  /// Returns an error if a page uses an unknown resolver or a resolver fails.
  pub fn compute_links(&self) -> Result<usize> {
    let runtime = tokio::runtime::Builder::new_current_thread()
      .build()
      .wrap_err("Failed to start async runtime")?;

    let links = runtime.block_on(try_join_all(self.directory.pages().iter().map(
      |page| {
        self
          .interlinker
          .compute_outbound_links(&page.url, &self.directory)
      },
    )))?;

    Ok(links.iter().map(Vec::len).sum())
  }

  /// Report dead links into `output_dir`.
  ///
  /// # Errors
  ///
  /// Returns an error if the report cannot be written.
  pub fn report(&self, output_dir: &Path) -> Result<()> {
    self
      .interlinker
      .after_build(output_dir)
      .wrap_err("Failed to report dead links")
  }
}

/// Resolve every link and report dead links without writing pages.
///
/// # Errors
///
/// Returns an error if pages fail to load or a link fails to resolve.
pub fn check(config: &Config) -> Result<()> {
  let site = Site::load(config)?;
  let links = site.compute_links()?;
  info!(
    "Resolved {links} links across {} pages, {} dead",
    site.directory.len(),
    site.interlinker.dead_links().len()
  );
  site.report(&config.output_dir)
}

/// Resolve every link, render each page to HTML and report dead links.
///
/// # Errors
///
/// Returns an error if pages fail to load, a link fails to resolve or a page
/// cannot be written.
pub fn build(config: &Config) -> Result<()> {
  info!("Starting build...");
  let site = Site::load(config)?;
  let links = site.compute_links()?;
  info!("Resolved {links} links across {} pages", site.directory.len());

  fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
    format!(
      "Failed to create output directory: {}",
      config.output_dir.display()
    )
  })?;

  let jobs = config.jobs.unwrap_or_else(num_cpus::get).max(1);
  let written = output::write_pages(
    &site.interlinker,
    site.directory.pages(),
    &config.output_dir,
    jobs,
  )?;
  site.report(&config.output_dir)?;

  info!(
    "Built {written} pages in {}",
    config.output_dir.display()
  );
  Ok(())
}
