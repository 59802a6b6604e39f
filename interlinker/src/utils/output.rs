use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use interlinker_core::{Interlinker, PageRecord};
use rayon::prelude::*;
use tera::Tera;

const PAGE_TEMPLATE: &str = include_str!("../../templates/page.html");
const PAGE_TEMPLATE_NAME: &str = "page.html";

/// Path of the `index.html` a page with `url` is written to.
#[must_use]
pub fn output_path(output_dir: &Path, url: &str) -> PathBuf {
  let trimmed = url.trim_matches('/');
  if trimmed.is_empty() {
    output_dir.join("index.html")
  } else {
    output_dir.join(trimmed).join("index.html")
  }
}

/// Page shell template wrapping each rendered page body.
///
/// # Errors
///
/// Returns an error if the bundled template fails to parse.
pub fn page_template() -> Result<Tera> {
  let mut tera = Tera::default();
  tera
    .add_raw_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)
    .wrap_err("Failed to parse page template")?;
  Ok(tera)
}

/// Render a single page, with its backlinks, to a complete HTML document.
///
/// # Errors
///
/// Returns an error if a wikilink cannot be rendered or the page template
/// fails.
pub fn render_page(
  tera: &Tera,
  interlinker: &Interlinker,
  page: &PageRecord,
) -> Result<String> {
  let content = interlinker
    .render_page(page)
    .wrap_err_with(|| format!("Failed to render {}", page.input_path))?;

  let mut context = tera::Context::new();
  context.insert("title", &page.title());
  context.insert("url", &page.url);
  context.insert("content", &content);
  context.insert("backlinks", &page.backlinks());

  tera
    .render(PAGE_TEMPLATE_NAME, &context)
    .wrap_err_with(|| format!("Failed to apply page template to {}", page.url))
}

/// Render every page into `output_dir` on a pool of `jobs` threads.
///
/// Returns the number of pages written.
///
/// # Errors
///
/// Returns an error if the thread pool cannot be created or any page fails to
/// render or write.
pub fn write_pages(
  interlinker: &Interlinker,
  pages: &[std::sync::Arc<PageRecord>],
  output_dir: &Path,
  jobs: usize,
) -> Result<usize> {
  let tera = page_template()?;
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(jobs)
    .build()
    .wrap_err("Failed to build render thread pool")?;

  pool.install(|| {
    pages
      .par_iter()
      .map(|page| {
        let html = render_page(&tera, interlinker, page)?;
        let path = output_path(output_dir, &page.url);
        if let Some(parent) = path.parent() {
          fs::create_dir_all(parent).wrap_err_with(|| {
            format!("Failed to create directory: {}", parent.display())
          })?;
        }
        fs::write(&path, html)
          .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Wrote {} to {}", page.url, path.display());
        Ok(())
      })
      .collect::<Result<Vec<()>>>()
  })?;

  Ok(pages.len())
}
