//! Wikilink notation parsing.
//!
//! Notations take the forms `[[target]]`, `[[target|label]]` and
//! `![[target]]`, where the target may carry an `#anchor`, a `resolver:`
//! prefix, or be a path reference starting with `/`, `./` or `../`.
//! A literal `#` or `:` in a target is written `/#` or `/:`.
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::{
  cache::{CacheKey, LinkCache},
  dead_links::{DeadLinks, UNKNOWN_SOURCE},
  directory::{LinkQuery, PageDirectory},
  error::{InterlinkError, Result},
  options::InterlinkerOptions,
  resolvers::{self, DEFAULT, DEFAULT_EMBED, NOT_FOUND_EMBED},
  types::WikilinkMeta,
  utils,
};

/// Matches a wikilink notation.
///
/// Capture 1 is the embed marker, 2 the target and 3 the optional label.
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(!?)\[\[([^|]+?)(?:\|([\s\S]+?))?\]\]").unwrap_or_else(|e| {
    log::error!("Failed to compile WIKILINK_RE regex: {e}");
    utils::never_matching_regex()
  })
});

/// The regex used to find wikilink notations in text.
#[must_use]
pub fn wikilink_regex() -> &'static Regex {
  &WIKILINK_RE
}

/// The raw parts of a notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Notation<'a> {
  is_embed: bool,
  target:   &'a str,
  label:    Option<&'a str>,
}

impl<'a> Notation<'a> {
  fn split(link: &'a str) -> Self {
    let (is_embed, rest) = match link.strip_prefix('!') {
      Some(rest) if rest.starts_with("[[") => (true, rest),
      _ => (false, link),
    };
    let body = rest
      .strip_prefix("[[")
      .and_then(|body| body.strip_suffix("]]"))
      .unwrap_or(rest);

    match body.split_once('|') {
      Some((target, label)) => {
        Self {
          is_embed,
          target,
          label: Some(label),
        }
      },
      None => {
        Self {
          is_embed,
          target: body,
          label: None,
        }
      },
    }
  }
}

/// Resolve a `./` or `../` reference against the directory of
/// `file_path_stem`.
fn resolve_relative(file_path_stem: &str, reference: &str) -> String {
  let mut segments: Vec<&str> = file_path_stem
    .split('/')
    .filter(|segment| !segment.is_empty())
    .collect();
  segments.pop();

  for part in reference.split('/') {
    match part {
      ".." => {
        segments.pop();
      },
      "." | "" => {},
      segment => segments.push(segment),
    }
  }

  format!("/{}", segments.join("/"))
}

/// Parses wikilink notations into cached descriptors.
pub struct WikilinkParser<'a> {
  options:    &'a InterlinkerOptions,
  cache:      &'a LinkCache,
  dead_links: &'a DeadLinks,
  source:     Option<&'a str>,
}

impl<'a> WikilinkParser<'a> {
  #[must_use]
  pub const fn new(
    options: &'a InterlinkerOptions,
    cache: &'a LinkCache,
    dead_links: &'a DeadLinks,
  ) -> Self {
    Self {
      options,
      cache,
      dead_links,
      source: None,
    }
  }

  /// Attribute dead links found by this parser to `source`.
  ///
  /// Without a source, dead links go to the tracker's current file.
  #[must_use]
  pub const fn with_source(mut self, source: &'a str) -> Self {
    self.source = Some(source);
    self
  }

  /// Parse a single notation.
  ///
  /// The descriptor is cached by notation text (and, for `./` and `../`
  /// references, by the directory of `file_path_stem`), so parsing the same
  /// notation again returns the same instance.
  ///
  /// # Errors
  ///
  /// Returns [`InterlinkError::RelativeWithoutContext`] for a relative path
  /// reference without `file_path_stem`, and
  /// [`InterlinkError::UnknownResolver`] when a `prefix:` names no registered
  /// resolver and the full target matches no page.
  pub fn parse_single(
    &self,
    link: &str,
    directory: &PageDirectory,
    file_path_stem: Option<&str>,
  ) -> Result<Arc<WikilinkMeta>> {
    let key = CacheKey::new(link, file_path_stem);
    if let Some(cached) = self.cache.get_key(&key) {
      if !cached.exists
        && (resolvers::is_default_resolver(&cached.resolver)
          || cached.resolver == NOT_FOUND_EMBED)
      {
        self.record_dead_link(link);
      }
      return Ok(cached);
    }

    let meta = self.parse_uncached(link, directory, file_path_stem)?;
    Ok(self.cache.insert(key, meta))
  }

  /// Parse every notation in `links`, in order.
  ///
  /// # Errors
  ///
  /// Returns the first error produced by [`WikilinkParser::parse_single`].
  pub fn parse_multiple<S: AsRef<str>>(
    &self,
    links: &[S],
    directory: &PageDirectory,
    file_path_stem: Option<&str>,
  ) -> Result<Vec<Arc<WikilinkMeta>>> {
    links
      .iter()
      .map(|link| self.parse_single(link.as_ref(), directory, file_path_stem))
      .collect()
  }

  /// Find and parse every notation in `document`, in order of appearance.
  ///
  /// # Errors
  ///
  /// Returns the first error produced by [`WikilinkParser::parse_single`].
  pub fn find(
    &self,
    document: &str,
    directory: &PageDirectory,
    file_path_stem: Option<&str>,
  ) -> Result<Vec<Arc<WikilinkMeta>>> {
    let links: Vec<&str> = WIKILINK_RE
      .find_iter(document)
      .map(|m| m.as_str())
      .collect();
    self.parse_multiple(&links, directory, file_path_stem)
  }

  fn record_dead_link(&self, link: &str) {
    match self.source {
      Some(source) => self.dead_links.add_from(link, source),
      None => self.dead_links.add(link),
    }
  }

  fn source_page(&self, file_path_stem: Option<&str>) -> String {
    self
      .source
      .or(file_path_stem)
      .unwrap_or(UNKNOWN_SOURCE)
      .to_string()
  }

  fn parse_uncached(
    &self,
    link: &str,
    directory: &PageDirectory,
    file_path_stem: Option<&str>,
  ) -> Result<WikilinkMeta> {
    let notation = Notation::split(link);

    let mut meta = WikilinkMeta::new(
      link,
      if notation.is_embed { DEFAULT_EMBED } else { DEFAULT },
    );
    meta.is_embed = notation.is_embed;
    meta.title = notation
      .label
      .map(str::trim)
      .filter(|label| !label.is_empty())
      .map(ToOwned::to_owned);

    let target = utils::strip_markdown_extension(notation.target).trim();
    let mut name = match utils::split_unescaped(target, '#') {
      Some((before, after)) => {
        let anchor = after.trim();
        if !anchor.is_empty() {
          meta.anchor = Some(anchor.to_string());
        }
        utils::strip_markdown_extension(before).trim().to_string()
      },
      None => target.to_string(),
    };
    name = utils::unescape(&name, '#');

    meta.is_path =
      name.starts_with('/') || name.starts_with("./") || name.starts_with("../");
    if meta.is_path && !name.starts_with('/') {
      let Some(stem) = file_path_stem else {
        return Err(InterlinkError::RelativeWithoutContext {
          link: link.to_string(),
        });
      };
      name = resolve_relative(stem, &name);
    }

    // A `prefix:` only selects a resolver when one is registered under that
    // name; otherwise the full name is looked up as a page.
    let mut unmatched_prefix = None;
    if let Some((prefix, rest)) = utils::split_unescaped(&name, ':') {
      let prefix = prefix.trim();
      if self.options.resolvers.contains(prefix) {
        meta.resolver = prefix.to_string();
        name = rest.trim().to_string();
      } else {
        unmatched_prefix = Some(prefix.to_string());
      }
    }
    name = utils::unescape(&name, ':');

    meta.slug = self.options.slug(&name);
    meta.name = name;

    let lookup = directory.find_by_link(&LinkQuery::wikilink(
      &meta.name,
      &meta.slug,
      meta.is_path,
    ));

    if let Some(page) = lookup.page {
      if meta.title.is_none() {
        meta.title = if lookup.found_by_alias {
          Some(meta.name.clone())
        } else {
          page.title().map(ToOwned::to_owned)
        };
      }
      meta.href = Some(page.url.clone());
      meta.path = Some(page.input_path.clone());
      meta.exists = true;
      meta.page = Some(page.url.clone());
    } else {
      if let Some(prefix) = unmatched_prefix {
        return Err(InterlinkError::UnknownResolver {
          resolver: prefix,
          link:     link.to_string(),
          page:     self.source_page(file_path_stem),
        });
      }

      if resolvers::is_default_resolver(&meta.resolver) {
        log::debug!("Wikilink {link} points to a missing page");
        self.record_dead_link(link);
        meta.href = self.options.stub_url.clone();
        if meta.is_embed {
          meta.resolver = NOT_FOUND_EMBED.to_string();
        }
      }
    }

    if !self.options.resolvers.contains(&meta.resolver) {
      return Err(InterlinkError::UnknownResolver {
        resolver: meta.resolver,
        link:     link.to_string(),
        page:     self.source_page(file_path_stem),
      });
    }

    Ok(meta)
  }
}
