//! The per-build link resolution engine.
use std::{fmt, path::Path, sync::Arc};

use futures::future::try_join_all;
use parking_lot::RwLock;

use crate::{
  cache::{EmbedCache, LinkCache},
  dead_links::DeadLinks,
  directory::PageDirectory,
  error::{InterlinkError, Result},
  markdown,
  options::InterlinkerOptions,
  parser::{HtmlLinkParser, WikilinkParser},
  resolvers::ResolveContext,
  template::TemplateRenderer,
  types::{Backlink, OutboundLink, PageRecord, WikilinkMeta},
};

/// Resolves links between the pages of a site.
///
/// One engine lives for a whole build cycle. It owns the wikilink cache, the
/// dead link tracker and the compiled embeds, all of which are cleared by
/// [`Interlinker::before_watch`] between rebuilds.
pub struct Interlinker {
  options:    InterlinkerOptions,
  cache:      LinkCache,
  dead_links: DeadLinks,
  embeds:     EmbedCache,
  renderer:   RwLock<Option<Arc<dyn TemplateRenderer>>>,
}

impl fmt::Debug for Interlinker {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Interlinker")
      .field("options", &self.options)
      .field("cache", &self.cache)
      .field("dead_links", &self.dead_links)
      .field("embeds", &self.embeds)
      .field("has_renderer", &self.renderer.read().is_some())
      .finish()
  }
}

impl Interlinker {
  #[must_use]
  pub fn new(options: InterlinkerOptions) -> Self {
    Self {
      options,
      cache: LinkCache::new(),
      dead_links: DeadLinks::new(),
      embeds: EmbedCache::new(),
      renderer: RwLock::new(None),
    }
  }

  #[must_use]
  pub const fn options(&self) -> &InterlinkerOptions {
    &self.options
  }

  #[must_use]
  pub const fn cache(&self) -> &LinkCache {
    &self.cache
  }

  #[must_use]
  pub const fn dead_links(&self) -> &DeadLinks {
    &self.dead_links
  }

  /// Install the template renderer used to compile embeds.
  pub fn on_config(&self, renderer: Arc<dyn TemplateRenderer>) {
    *self.renderer.write() = Some(renderer);
  }

  #[must_use]
  pub fn renderer(&self) -> Option<Arc<dyn TemplateRenderer>> {
    self.renderer.read().clone()
  }

  /// A wikilink parser sharing this engine's cache and dead link tracker.
  #[must_use]
  pub const fn wikilink_parser(&self) -> WikilinkParser<'_> {
    WikilinkParser::new(&self.options, &self.cache, &self.dead_links)
  }

  /// Discover, parse and resolve every outbound link of the page at
  /// `page_url`.
  ///
  /// Each linked page gets a backlink to this page. Wikilinks are resolved
  /// concurrently; each distinct descriptor runs its resolver at most once
  /// per build cycle.
  ///
  /// Returns an empty list when the page is unknown or its content is not
  /// available yet.
  ///
  /// # Errors
  ///
  /// Returns an error if a wikilink fails to parse or a resolver fails.
  pub async fn compute_outbound_links(
    &self,
    page_url: &str,
    directory: &PageDirectory,
  ) -> Result<Vec<OutboundLink>> {
    let Some(page) = directory.find_by_file(page_url) else {
      log::debug!("No page found for {page_url}, skipping link discovery");
      return Ok(Vec::new());
    };
    let Some(content) = page.content.as_deref() else {
      return Ok(Vec::new());
    };
    if page.input_path.is_empty() {
      return Ok(Vec::new());
    }

    self.dead_links.set_file_src(page.input_path.as_str());

    let wikilinks = self
      .wikilink_parser()
      .with_source(&page.input_path)
      .find(content, directory, Some(&page.file_path_stem))?;
    let html_links = HtmlLinkParser::new(&self.dead_links)
      .with_source(&page.input_path)
      .find(content, directory);

    let outbound: Vec<OutboundLink> = wikilinks
      .iter()
      .map(|link| OutboundLink::Wikilink(Arc::clone(link)))
      .chain(html_links.into_iter().map(OutboundLink::Html))
      .collect();

    for target in outbound.iter().filter_map(OutboundLink::page) {
      if let Some(target) = directory.find_by_file(target) {
        target.add_backlink(Backlink {
          url:   page.url.clone(),
          title: page.title().map(ToOwned::to_owned),
        });
      }
    }

    let renderer = self.renderer();
    let cx = ResolveContext {
      options: &self.options,
      directory,
      renderer: renderer.as_deref(),
      embeds: &self.embeds,
    };
    try_join_all(wikilinks.iter().map(|link| self.dispatch(link, &page, &cx)))
      .await?;

    log::debug!(
      "Resolved {} outbound links for {}",
      outbound.len(),
      page.url
    );
    Ok(outbound)
  }

  async fn dispatch(
    &self,
    link: &WikilinkMeta,
    page: &PageRecord,
    cx: &ResolveContext<'_>,
  ) -> Result<()> {
    let resolver = self.options.resolvers.get(&link.resolver).ok_or_else(|| {
      InterlinkError::UnknownResolver {
        resolver: link.resolver.clone(),
        link:     link.link.clone(),
        page:     page.input_path.clone(),
      }
    })?;
    link
      .resolve_with(|| async { resolver.resolve(link, page, cx).await })
      .await
  }

  /// Render a parsed wikilink for inclusion in page output.
  ///
  /// # Errors
  ///
  /// Returns [`InterlinkError::MissingEmbed`] for an embed of an existing
  /// page whose content was never compiled.
  pub fn render_link(&self, link: &WikilinkMeta) -> Result<String> {
    markdown::render_link(link)
  }

  /// Render the markdown body of `page` to HTML with every resolved
  /// wikilink replaced by its output.
  ///
  /// # Errors
  ///
  /// Returns an error if a wikilink cannot be rendered.
  pub fn render_page(&self, page: &PageRecord) -> Result<String> {
    let content = page.content.as_deref().unwrap_or_default();
    markdown::render_markdown(content, &self.cache, Some(&page.file_path_stem))
  }

  /// Report dead links in the configured format.
  ///
  /// # Errors
  ///
  /// Returns an error if the report cannot be written.
  pub fn after_build(&self, output_dir: &Path) -> Result<()> {
    if self.dead_links.is_empty() {
      return Ok(());
    }
    self
      .dead_links
      .report(self.options.dead_link_report, output_dir)
  }

  /// Reset all per-build state before a rebuild.
  pub fn before_watch(&self) {
    log::debug!("Clearing link cache and dead links before rebuild");
    self.cache.clear();
    self.dead_links.clear();
    self.embeds.clear();
  }
}
