//! Options controlling link resolution.
//!
//! # Examples
//!
//! ```
//! use interlinker_core::{InterlinkerOptionsBuilder, ReportFormat};
//!
//! let options = InterlinkerOptionsBuilder::new()
//!   .default_layout(Some("embed.html"))
//!   .stub_url(None::<String>)
//!   .dead_link_report(ReportFormat::Json)
//!   .resolver_fn("issue", |link, _page| {
//!     format!("<a href=\"https://example.com/issues/{}\">#{0}</a>", link.name)
//!   })
//!   .build();
//!
//! assert!(options.resolvers.contains("issue"));
//! assert!(options.stub_url.is_none());
//! ```
use std::{fmt, sync::Arc};

use crate::{
  dead_links::ReportFormat,
  resolvers::{
    NOT_FOUND_EMBED,
    Resolver,
    Resolvers,
    UNABLE_TO_LOCATE_EMBED,
  },
  types::{PageRecord, WikilinkMeta},
  utils,
};

/// Front matter key selecting the embed layout of a page.
pub const DEFAULT_LAYOUT_KEY: &str = "embedLayout";
/// Front matter key selecting the embed template language of a page.
pub const DEFAULT_LAYOUT_TEMPLATE_LANG_KEY: &str = "embedLayoutLanguage";
/// Href given to links whose target does not exist.
pub const DEFAULT_STUB_URL: &str = "/stubs";

/// Function turning a wikilink target name into a slug.
pub type SlugifyFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Options for link resolution.
#[derive(Clone)]
pub struct InterlinkerOptions {
  /// Layout wrapping embeds of pages that don't choose their own.
  pub default_layout: Option<String>,

  /// Template language for embeds of pages that don't choose their own.
  pub default_layout_lang: Option<String>,

  /// Front matter key a page uses to choose its embed layout.
  pub layout_key: String,

  /// Front matter key a page uses to choose its embed template language.
  pub layout_template_lang_key: String,

  /// Href for dead links. `None` leaves dead links as their raw notation.
  pub stub_url: Option<String>,

  /// How dead links are reported after a build.
  pub dead_link_report: ReportFormat,

  /// Output of the built-in `404-embed` resolver.
  pub unable_to_locate_embed: String,

  /// Registered resolvers, built-ins included.
  pub resolvers: Resolvers,

  /// Slug function used to match wikilink targets against file slugs.
  pub slugify: SlugifyFn,
}

impl Default for InterlinkerOptions {
  fn default() -> Self {
    Self {
      default_layout:           None,
      default_layout_lang:      None,
      layout_key:               DEFAULT_LAYOUT_KEY.to_string(),
      layout_template_lang_key: DEFAULT_LAYOUT_TEMPLATE_LANG_KEY.to_string(),
      stub_url:                 Some(DEFAULT_STUB_URL.to_string()),
      dead_link_report:         ReportFormat::default(),
      unable_to_locate_embed:   UNABLE_TO_LOCATE_EMBED.to_string(),
      resolvers:                Resolvers::new(),
      slugify:                  Arc::new(utils::slugify),
    }
  }
}

impl fmt::Debug for InterlinkerOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InterlinkerOptions")
      .field("default_layout", &self.default_layout)
      .field("default_layout_lang", &self.default_layout_lang)
      .field("layout_key", &self.layout_key)
      .field("layout_template_lang_key", &self.layout_template_lang_key)
      .field("stub_url", &self.stub_url)
      .field("dead_link_report", &self.dead_link_report)
      .field("unable_to_locate_embed", &self.unable_to_locate_embed)
      .field("resolvers", &self.resolvers)
      .finish_non_exhaustive()
  }
}

impl InterlinkerOptions {
  /// Slug of `text` using the configured slug function.
  #[must_use]
  pub fn slug(&self, text: &str) -> String {
    (self.slugify)(text)
  }
}

/// Builder for constructing `InterlinkerOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct InterlinkerOptionsBuilder {
  options: InterlinkerOptions,
}

impl InterlinkerOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn default_layout<S: Into<String>>(mut self, layout: Option<S>) -> Self {
    self.options.default_layout = layout.map(Into::into);
    self
  }

  #[must_use]
  pub fn default_layout_lang<S: Into<String>>(mut self, lang: Option<S>) -> Self {
    self.options.default_layout_lang = lang.map(Into::into);
    self
  }

  #[must_use]
  pub fn layout_key(mut self, key: impl Into<String>) -> Self {
    self.options.layout_key = key.into();
    self
  }

  #[must_use]
  pub fn layout_template_lang_key(mut self, key: impl Into<String>) -> Self {
    self.options.layout_template_lang_key = key.into();
    self
  }

  /// Set the href for dead links, or disable stub links with `None`.
  #[must_use]
  pub fn stub_url<S: Into<String>>(mut self, url: Option<S>) -> Self {
    self.options.stub_url = url.map(Into::into);
    self
  }

  #[must_use]
  pub const fn dead_link_report(mut self, format: ReportFormat) -> Self {
    self.options.dead_link_report = format;
    self
  }

  /// Set the placeholder rendered for embeds of missing pages.
  #[must_use]
  pub fn unable_to_locate_embed(mut self, text: impl Into<String>) -> Self {
    self.options.unable_to_locate_embed = text.into();
    self
  }

  /// Render embeds of missing pages with `f`, called with the slug of the
  /// linking page.
  #[deprecated(note = "register a resolver named `404-embed` instead")]
  #[must_use]
  pub fn unable_to_locate_embed_fn<F>(self, f: F) -> Self
  where
    F: Fn(&str) -> String + Send + Sync + 'static,
  {
    self.resolver_fn(NOT_FOUND_EMBED, move |_link, page| f(&page.file_slug))
  }

  /// Register `resolver` under `name`.
  #[must_use]
  pub fn resolver(
    mut self,
    name: impl Into<String>,
    resolver: impl Resolver + 'static,
  ) -> Self {
    self.options.resolvers.register(name, resolver);
    self
  }

  /// Register a synchronous closure as the resolver `name`.
  #[must_use]
  pub fn resolver_fn<F>(mut self, name: impl Into<String>, resolver: F) -> Self
  where
    F: Fn(&WikilinkMeta, &PageRecord) -> String + Send + Sync + 'static,
  {
    self.options.resolvers.register_fn(name, resolver);
    self
  }

  /// Replace the slug function.
  #[must_use]
  pub fn slugify<F>(mut self, slugify: F) -> Self
  where
    F: Fn(&str) -> String + Send + Sync + 'static,
  {
    self.options.slugify = Arc::new(slugify);
    self
  }

  /// Build the final `InterlinkerOptions`.
  #[must_use]
  pub fn build(self) -> InterlinkerOptions {
    self.options
  }
}
