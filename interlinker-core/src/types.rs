//! Page records and link descriptors shared across the crate.
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

/// A page that links back to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backlink {
  /// Url of the linking page.
  pub url:   String,
  /// Title of the linking page, if it has one.
  pub title: Option<String>,
}

/// A page known to the host site generator.
///
/// Pages are shared between the directory and every link descriptor that
/// points at them; the backlink list is the only mutable part.
#[derive(Debug, Default)]
pub struct PageRecord {
  /// Public url of the page, e.g. `/blog/hello-world/`.
  pub url:             String,
  /// Short identifier derived from the file name.
  pub file_slug:       String,
  /// Path of the source file relative to the input root, without extension.
  pub file_path_stem:  String,
  /// Path of the source file as given by the host.
  pub input_path:      String,
  /// Template language the page itself is written in, e.g. `tera,md`.
  pub template_syntax: Option<String>,
  /// Front matter data, including `title` and `aliases`.
  pub data:            Map<String, Value>,
  /// Raw page body. `None` while the content is not yet available.
  pub content:         Option<String>,
  backlinks:           Mutex<Vec<Backlink>>,
}

impl PageRecord {
  /// Create a page at `url` with no other properties set.
  #[must_use]
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      ..Self::default()
    }
  }

  #[must_use]
  pub fn with_file_slug(mut self, file_slug: impl Into<String>) -> Self {
    self.file_slug = file_slug.into();
    self
  }

  #[must_use]
  pub fn with_file_path_stem(mut self, stem: impl Into<String>) -> Self {
    self.file_path_stem = stem.into();
    self
  }

  #[must_use]
  pub fn with_input_path(mut self, input_path: impl Into<String>) -> Self {
    self.input_path = input_path.into();
    self
  }

  #[must_use]
  pub fn with_template_syntax(mut self, syntax: impl Into<String>) -> Self {
    self.template_syntax = Some(syntax.into());
    self
  }

  #[must_use]
  pub fn with_content(mut self, content: impl Into<String>) -> Self {
    self.content = Some(content.into());
    self
  }

  #[must_use]
  pub fn with_title(self, title: impl Into<String>) -> Self {
    self.with_data("title", Value::String(title.into()))
  }

  #[must_use]
  pub fn with_aliases<I, S>(self, aliases: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let aliases = aliases
      .into_iter()
      .map(|alias| Value::String(alias.into()))
      .collect();
    self.with_data("aliases", Value::Array(aliases))
  }

  #[must_use]
  pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
    self.data.insert(key.into(), value);
    self
  }

  /// The page title from front matter.
  #[must_use]
  pub fn title(&self) -> Option<&str> {
    self.data.get("title").and_then(Value::as_str)
  }

  /// The page aliases from front matter.
  ///
  /// A single string is treated as a one element list; non-string entries
  /// are ignored.
  #[must_use]
  pub fn aliases(&self) -> Vec<&str> {
    match self.data.get("aliases") {
      Some(Value::String(alias)) => vec![alias.as_str()],
      Some(Value::Array(aliases)) => {
        aliases.iter().filter_map(Value::as_str).collect()
      },
      _ => Vec::new(),
    }
  }

  /// Snapshot of the pages linking to this one, in insertion order.
  #[must_use]
  pub fn backlinks(&self) -> Vec<Backlink> {
    self.backlinks.lock().clone()
  }

  /// Record `backlink`, unless a backlink with the same url already exists.
  ///
  /// Returns `true` if the backlink was added.
  pub fn add_backlink(&self, backlink: Backlink) -> bool {
    let mut backlinks = self.backlinks.lock();
    if backlinks.iter().any(|existing| existing.url == backlink.url) {
      return false;
    }
    backlinks.push(backlink);
    true
  }

  /// Forget all recorded backlinks.
  pub fn clear_backlinks(&self) {
    self.backlinks.lock().clear();
  }
}

/// Parsed form of a single wikilink notation.
///
/// Descriptors are created once per distinct notation and shared through the
/// link cache, so every field except the resolved content is fixed at parse
/// time. `page` holds the url of the target page rather than the page itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WikilinkMeta {
  /// The raw notation, e.g. `![[Page#Section|Label]]`.
  pub link:      String,
  /// Explicit label, or a title backfilled from the target page.
  pub title:     Option<String>,
  /// Normalised target name.
  pub name:      String,
  /// Slug of `name`.
  pub slug:      String,
  pub anchor:    Option<String>,
  pub is_embed:  bool,
  /// Whether `name` is a file path stem rather than a title or slug.
  pub is_path:   bool,
  /// Name of the resolver that renders this link.
  pub resolver:  String,
  pub exists:    bool,
  /// Url of the resolved page.
  pub page:      Option<String>,
  /// Target href. `None` for dead links when stub urls are disabled.
  pub href:      Option<String>,
  /// Input path of the resolved page.
  pub path:      Option<String>,
  #[serde(skip)]
  content:       OnceCell<Option<String>>,
}

impl WikilinkMeta {
  /// Create a descriptor for `link` with every lookup field unset.
  #[must_use]
  pub fn new(link: impl Into<String>, resolver: impl Into<String>) -> Self {
    Self {
      link:     link.into(),
      title:    None,
      name:     String::new(),
      slug:     String::new(),
      anchor:   None,
      is_embed: false,
      is_path:  false,
      resolver: resolver.into(),
      exists:   false,
      page:     None,
      href:     None,
      path:     None,
      content:  OnceCell::new(),
    }
  }

  /// Output produced by the resolver, if it has run and produced any.
  #[must_use]
  pub fn content(&self) -> Option<&str> {
    self.content.get().and_then(Option::as_deref)
  }

  /// Whether the resolver for this descriptor has already run.
  #[must_use]
  pub fn is_resolved(&self) -> bool {
    self.content.initialized()
  }

  /// Run `resolve` to produce this descriptor's content, at most once.
  ///
  /// Concurrent callers wait for the first resolution instead of running the
  /// resolver again. A failed resolution leaves the content unset.
  ///
  /// # Errors
  ///
  /// Returns the error produced by `resolve`.
  pub async fn resolve_with<F, Fut, E>(&self, resolve: F) -> Result<(), E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<String>, E>>,
  {
    self.content.get_or_try_init(resolve).await.map(|_| ())
  }
}

/// A plain HTML anchor found in page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkMeta {
  /// Normalised href of the anchor.
  pub href:   String,
  pub exists: bool,
  /// Url of the resolved page.
  pub page:   Option<String>,
}

impl LinkMeta {
  /// HTML anchors are never embeds.
  #[must_use]
  pub const fn is_embed(&self) -> bool {
    false
  }
}

/// One outbound link of a page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutboundLink {
  Wikilink(Arc<WikilinkMeta>),
  Html(LinkMeta),
}

impl OutboundLink {
  #[must_use]
  pub fn exists(&self) -> bool {
    match self {
      Self::Wikilink(link) => link.exists,
      Self::Html(link) => link.exists,
    }
  }

  /// Url of the target page, if resolved.
  #[must_use]
  pub fn page(&self) -> Option<&str> {
    match self {
      Self::Wikilink(link) => link.page.as_deref(),
      Self::Html(link) => link.page.as_deref(),
    }
  }

  #[must_use]
  pub fn is_embed(&self) -> bool {
    match self {
      Self::Wikilink(link) => link.is_embed,
      Self::Html(link) => link.is_embed(),
    }
  }

  #[must_use]
  pub const fn as_wikilink(&self) -> Option<&Arc<WikilinkMeta>> {
    match self {
      Self::Wikilink(link) => Some(link),
      Self::Html(_) => None,
    }
  }
}
