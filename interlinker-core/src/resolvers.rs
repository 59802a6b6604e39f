//! Named strategies that turn a wikilink descriptor into output.
//!
//! Every wikilink carries the name of its resolver. The built-in resolvers
//! render plain links, embeds of existing pages and a placeholder for embeds
//! of missing pages; hosts can register their own under any other name and
//! select them with a `name:` prefix inside the wikilink.
use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
  cache::EmbedCache,
  directory::PageDirectory,
  error::Result,
  options::InterlinkerOptions,
  template::TemplateRenderer,
  types::{PageRecord, WikilinkMeta},
};

/// Resolver for plain wikilinks.
pub const DEFAULT: &str = "default";
/// Resolver for embeds of existing pages.
pub const DEFAULT_EMBED: &str = "default-embed";
/// Resolver for embeds of missing pages.
pub const NOT_FOUND_EMBED: &str = "404-embed";

/// Placeholder rendered for embeds of missing pages.
pub const UNABLE_TO_LOCATE_EMBED: &str = "[UNABLE TO LOCATE EMBED]";

/// Collaborators available to a resolver.
pub struct ResolveContext<'a> {
  pub options:   &'a InterlinkerOptions,
  pub directory: &'a PageDirectory,
  pub renderer:  Option<&'a dyn TemplateRenderer>,
  pub embeds:    &'a EmbedCache,
}

/// A strategy producing the output for a wikilink.
#[async_trait]
pub trait Resolver: Send + Sync {
  /// Produce the output for `link`, found on the page `page`.
  ///
  /// `None` means the resolver has nothing to render.
  async fn resolve(
    &self,
    link: &WikilinkMeta,
    page: &PageRecord,
    cx: &ResolveContext<'_>,
  ) -> Result<Option<String>>;
}

/// Adapts a synchronous closure into a [`Resolver`].
pub struct FnResolver<F>(pub F);

#[async_trait]
impl<F> Resolver for FnResolver<F>
where
  F: Fn(&WikilinkMeta, &PageRecord) -> String + Send + Sync,
{
  async fn resolve(
    &self,
    link: &WikilinkMeta,
    page: &PageRecord,
    _cx: &ResolveContext<'_>,
  ) -> Result<Option<String>> {
    Ok(Some((self.0)(link, page)))
  }
}

/// Renders `<a href="...">title</a>`.
///
/// Dead links without a stub url are rendered as the original notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

#[async_trait]
impl Resolver for DefaultResolver {
  async fn resolve(
    &self,
    link: &WikilinkMeta,
    _page: &PageRecord,
    _cx: &ResolveContext<'_>,
  ) -> Result<Option<String>> {
    Ok(Some(link_html(link)))
  }
}

/// Anchor markup for a plain wikilink.
///
/// A link without an href renders as its original notation.
#[must_use]
pub fn link_html(link: &WikilinkMeta) -> String {
  let Some(href) = link.href.as_deref() else {
    return link.link.clone();
  };

  let href = match &link.anchor {
    Some(anchor) => format!("{href}#{anchor}"),
    None => href.to_string(),
  };
  let text = link.title.as_deref().unwrap_or(&link.name);

  format!(
    "<a href=\"{}\">{}</a>",
    html_escape::encode_double_quoted_attribute(&href),
    html_escape::encode_text(text)
  )
}

/// Compiles the target page through its embed layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEmbedResolver;

#[async_trait]
impl Resolver for DefaultEmbedResolver {
  async fn resolve(
    &self,
    link: &WikilinkMeta,
    _page: &PageRecord,
    cx: &ResolveContext<'_>,
  ) -> Result<Option<String>> {
    let Some(renderer) = cx.renderer else {
      log::debug!("No template renderer installed, skipping embed {}", link.link);
      return Ok(None);
    };
    let Some(target) = link
      .page
      .as_deref()
      .and_then(|url| cx.directory.find_by_file(url))
    else {
      return Ok(None);
    };

    if let Some(compiled) = cx.embeds.get(&target.url) {
      return Ok(Some(compiled));
    }

    let compiled = compile_embed(&target, cx.options, renderer).await?;
    cx.embeds.insert(target.url.clone(), compiled.clone());
    Ok(Some(compiled))
  }
}

async fn compile_embed(
  target: &PageRecord,
  options: &InterlinkerOptions,
  renderer: &dyn TemplateRenderer,
) -> Result<String> {
  let data_str = |key: &str| target.data.get(key).and_then(Value::as_str);

  let layout = data_str(&options.layout_key).or(options.default_layout.as_deref());
  let content = target.content.as_deref().unwrap_or_default();

  let (template, fallback_lang) = match layout {
    Some(layout) => (renderer.wrap_in_layout(layout, content), "tera,md"),
    None => (content.to_string(), "md"),
  };
  let language = data_str(&options.layout_template_lang_key)
    .or(options.default_layout_lang.as_deref())
    .or(target.template_syntax.as_deref())
    .unwrap_or(fallback_lang);

  log::debug!(
    "Compiling embed of {} (layout: {}, language: {language})",
    target.url,
    layout.unwrap_or("none")
  );
  renderer.compile(&template, language, &target.data).await
}

/// Renders the "unable to locate" placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundEmbedResolver;

#[async_trait]
impl Resolver for NotFoundEmbedResolver {
  async fn resolve(
    &self,
    _link: &WikilinkMeta,
    _page: &PageRecord,
    cx: &ResolveContext<'_>,
  ) -> Result<Option<String>> {
    Ok(Some(cx.options.unable_to_locate_embed.clone()))
  }
}

/// Registry of resolvers by name.
#[derive(Clone)]
pub struct Resolvers {
  resolvers: HashMap<String, Arc<dyn Resolver>>,
}

impl Default for Resolvers {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Resolvers {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut names = self.names();
    names.sort_unstable();
    f.debug_struct("Resolvers").field("names", &names).finish()
  }
}

impl Resolvers {
  /// Create a registry holding the built-in resolvers.
  #[must_use]
  pub fn new() -> Self {
    let mut resolvers = Self {
      resolvers: HashMap::new(),
    };
    resolvers
      .register(DEFAULT, DefaultResolver)
      .register(DEFAULT_EMBED, DefaultEmbedResolver)
      .register(NOT_FOUND_EMBED, NotFoundEmbedResolver);
    resolvers
  }

  /// Register `resolver` under `name`, replacing any resolver of that name.
  pub fn register(
    &mut self,
    name: impl Into<String>,
    resolver: impl Resolver + 'static,
  ) -> &mut Self {
    self.resolvers.insert(name.into(), Arc::new(resolver));
    self
  }

  /// Register a synchronous closure under `name`.
  pub fn register_fn<F>(&mut self, name: impl Into<String>, resolver: F) -> &mut Self
  where
    F: Fn(&WikilinkMeta, &PageRecord) -> String + Send + Sync + 'static,
  {
    self.register(name, FnResolver(resolver))
  }

  #[must_use]
  pub fn get(&self, name: &str) -> Option<Arc<dyn Resolver>> {
    self.resolvers.get(name).map(Arc::clone)
  }

  #[must_use]
  pub fn contains(&self, name: &str) -> bool {
    self.resolvers.contains_key(name)
  }

  #[must_use]
  pub fn names(&self) -> Vec<&str> {
    self.resolvers.keys().map(String::as_str).collect()
  }
}

/// Whether `name` is one of the resolvers that render plain links or embeds
/// and so take part in dead link handling.
#[must_use]
pub fn is_default_resolver(name: &str) -> bool {
  name == DEFAULT || name == DEFAULT_EMBED
}
