//! Discovery of internal HTML anchors in page content.
use kuchikikiki::traits::TendrilSink;

use crate::{
  dead_links::DeadLinks,
  directory::{LinkQuery, PageDirectory},
  types::LinkMeta,
  utils,
};

/// Normalise an anchor href for page lookup.
///
/// Drops any `#fragment`, strips a markdown extension and backslashes, and
/// trims surrounding whitespace.
#[must_use]
pub fn normalize_href(href: &str) -> String {
  let without_fragment = href.split('#').next().unwrap_or_default();
  let without_backslashes = without_fragment.replace('\\', "");
  utils::strip_markdown_extension(&without_backslashes)
    .trim()
    .to_string()
}

/// Collect the hrefs of internal anchors in `html`.
///
/// Only `<a>` elements whose href starts with a single `/` are returned;
/// anchors inside `<code>` or `<pre>` are ignored.
#[must_use]
pub fn internal_hrefs(html: &str) -> Vec<String> {
  let document = kuchikikiki::parse_html().one(html);
  let Ok(anchors) = document.select("a[href]") else {
    return Vec::new();
  };

  anchors
    .filter(|anchor| {
      !anchor.as_node().ancestors().any(|ancestor| {
        ancestor.as_element().is_some_and(|element| {
          matches!(element.name.local.as_ref(), "code" | "pre")
        })
      })
    })
    .filter_map(|anchor| {
      anchor
        .attributes
        .borrow()
        .get("href")
        .filter(|href| href.starts_with('/') && !href.starts_with("//"))
        .map(ToOwned::to_owned)
    })
    .collect()
}

/// Resolves internal HTML anchors against the page directory.
pub struct HtmlLinkParser<'a> {
  dead_links: &'a DeadLinks,
  source:     Option<&'a str>,
}

impl<'a> HtmlLinkParser<'a> {
  #[must_use]
  pub const fn new(dead_links: &'a DeadLinks) -> Self {
    Self {
      dead_links,
      source: None,
    }
  }

  /// Attribute dead links found by this parser to `source`.
  #[must_use]
  pub const fn with_source(mut self, source: &'a str) -> Self {
    self.source = Some(source);
    self
  }

  /// Resolve a single href.
  ///
  /// Missing targets are recorded as dead links under the href as written.
  #[must_use]
  pub fn parse_single(&self, href: &str, directory: &PageDirectory) -> LinkMeta {
    let normalized = normalize_href(href);
    let lookup = directory.find_by_link(&LinkQuery::href(&normalized));

    if !lookup.found() {
      log::debug!("Link {href} points to a missing page");
      match self.source {
        Some(source) => self.dead_links.add_from(href, source),
        None => self.dead_links.add(href),
      }
    }

    LinkMeta {
      href:   normalized,
      exists: lookup.found(),
      page:   lookup.page.map(|page| page.url.clone()),
    }
  }

  #[must_use]
  pub fn parse_multiple<S: AsRef<str>>(
    &self,
    hrefs: &[S],
    directory: &PageDirectory,
  ) -> Vec<LinkMeta> {
    hrefs
      .iter()
      .map(|href| self.parse_single(href.as_ref(), directory))
      .collect()
  }

  /// Find and resolve every internal anchor in `document`.
  #[must_use]
  pub fn find(&self, document: &str, directory: &PageDirectory) -> Vec<LinkMeta> {
    self.parse_multiple(&internal_hrefs(document), directory)
  }
}
