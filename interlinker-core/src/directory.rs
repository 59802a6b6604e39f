//! Lookup of pages by wikilink target or url.
use std::sync::Arc;

use crate::types::PageRecord;

/// What a link is looking for.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkQuery<'a> {
  /// Target name; a file path stem when `is_path` is set.
  pub name:    Option<&'a str>,
  /// Slug of the target name.
  pub slug:    Option<&'a str>,
  /// Literal href, compared against page urls.
  pub href:    Option<&'a str>,
  pub is_path: bool,
}

impl<'a> LinkQuery<'a> {
  /// Query for a wikilink target.
  #[must_use]
  pub const fn wikilink(name: &'a str, slug: &'a str, is_path: bool) -> Self {
    Self {
      name: Some(name),
      slug: Some(slug),
      href: None,
      is_path,
    }
  }

  /// Query for an HTML anchor href.
  #[must_use]
  pub const fn href(href: &'a str) -> Self {
    Self {
      name:    None,
      slug:    None,
      href:    Some(href),
      is_path: false,
    }
  }
}

/// Result of a page lookup.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
  pub page:           Option<Arc<PageRecord>>,
  /// Whether the page was matched through one of its aliases.
  pub found_by_alias: bool,
}

impl Lookup {
  #[must_use]
  pub const fn found(&self) -> bool {
    self.page.is_some()
  }
}

/// The set of pages a build knows about.
#[derive(Debug, Clone, Default)]
pub struct PageDirectory {
  pages: Vec<Arc<PageRecord>>,
}

impl PageDirectory {
  #[must_use]
  pub const fn new(pages: Vec<Arc<PageRecord>>) -> Self {
    Self { pages }
  }

  #[must_use]
  pub fn pages(&self) -> &[Arc<PageRecord>] {
    &self.pages
  }

  #[must_use]
  pub const fn len(&self) -> usize {
    self.pages.len()
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }

  /// Find the page a link points at.
  ///
  /// Strategies are tried in order and the first match wins:
  ///
  /// 1. a path query matches the page's file path stem
  /// 2. an href matches the page url, with or without a trailing slash
  /// 3. the slug matches the page's file slug, or failing that the name
  ///    matches its title exactly
  /// 4. the name is one of the page's aliases
  ///
  /// Within a strategy, pages are searched in directory order.
  #[must_use]
  pub fn find_by_link(&self, query: &LinkQuery<'_>) -> Lookup {
    let found = |page: Option<&Arc<PageRecord>>| {
      Lookup {
        page:           page.cloned(),
        found_by_alias: false,
      }
    };

    if query.is_path {
      let Some(name) = query.name else {
        return Lookup::default();
      };
      return found(self.pages.iter().find(|p| p.file_path_stem == name));
    }

    if let Some(href) = query.href {
      return found(
        self
          .pages
          .iter()
          .find(|p| p.url == href || p.url.strip_suffix('/') == Some(href)),
      );
    }

    let by_slug = query
      .slug
      .and_then(|slug| self.pages.iter().find(|page| page.file_slug == slug));
    if by_slug.is_some() {
      return found(by_slug);
    }

    let Some(name) = query.name else {
      return Lookup::default();
    };
    let by_title = self.pages.iter().find(|page| page.title() == Some(name));
    if by_title.is_some() {
      return found(by_title);
    }

    let by_alias = self
      .pages
      .iter()
      .find(|page| page.aliases().contains(&name));

    Lookup {
      page:           by_alias.cloned(),
      found_by_alias: by_alias.is_some(),
    }
  }

  /// Find the page whose url is `url`.
  #[must_use]
  pub fn find_by_file(&self, url: &str) -> Option<Arc<PageRecord>> {
    self.pages.iter().find(|page| page.url == url).cloned()
  }
}

impl FromIterator<PageRecord> for PageDirectory {
  fn from_iter<I: IntoIterator<Item = PageRecord>>(iter: I) -> Self {
    Self::new(iter.into_iter().map(Arc::new).collect())
  }
}
