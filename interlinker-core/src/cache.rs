//! Caches shared across a build cycle.
use std::{collections::HashMap, sync::Arc};

use parking_lot::{Mutex, RwLock};

use crate::types::WikilinkMeta;

/// Key of a cached wikilink descriptor.
///
/// Relative notations (`./x`, `../x`) resolve differently depending on the
/// directory of the linking file, so that directory is part of their key.
/// Every other notation is keyed by its raw text alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  link:  String,
  scope: Option<String>,
}

impl CacheKey {
  #[must_use]
  pub fn new(link: &str, file_path_stem: Option<&str>) -> Self {
    let scope = if is_relative_notation(link) {
      file_path_stem.map(|stem| {
        stem
          .rsplit_once('/')
          .map_or_else(String::new, |(dir, _)| dir.to_string())
      })
    } else {
      None
    };

    Self {
      link: link.to_string(),
      scope,
    }
  }

  #[must_use]
  pub fn link(&self) -> &str {
    &self.link
  }
}

fn is_relative_notation(link: &str) -> bool {
  let body = link.strip_prefix('!').unwrap_or(link);
  let body = body.strip_prefix("[[").unwrap_or(body).trim_start();
  body.starts_with("./") || body.starts_with("../")
}

/// Parsed wikilink descriptors keyed by raw notation.
#[derive(Debug, Default)]
pub struct LinkCache {
  entries: RwLock<HashMap<CacheKey, Arc<WikilinkMeta>>>,
}

impl LinkCache {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Descriptor for `link` as seen from a file at `file_path_stem`.
  #[must_use]
  pub fn get(&self, link: &str, file_path_stem: Option<&str>) -> Option<Arc<WikilinkMeta>> {
    self.get_key(&CacheKey::new(link, file_path_stem))
  }

  #[must_use]
  pub fn get_key(&self, key: &CacheKey) -> Option<Arc<WikilinkMeta>> {
    self.entries.read().get(key).map(Arc::clone)
  }

  /// Store `meta` under `key` and return the cached descriptor.
  ///
  /// If another caller stored a descriptor for `key` first, that one is kept
  /// and returned so every caller shares a single instance.
  pub fn insert(&self, key: CacheKey, meta: WikilinkMeta) -> Arc<WikilinkMeta> {
    let mut entries = self.entries.write();
    Arc::clone(entries.entry(key).or_insert_with(|| Arc::new(meta)))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }

  pub fn clear(&self) {
    self.entries.write().clear();
  }
}

/// Compiled embed output keyed by target page url.
#[derive(Debug, Default)]
pub struct EmbedCache {
  compiled: Mutex<HashMap<String, String>>,
}

impl EmbedCache {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn get(&self, url: &str) -> Option<String> {
    self.compiled.lock().get(url).cloned()
  }

  pub fn insert(&self, url: impl Into<String>, compiled: impl Into<String>) {
    self.compiled.lock().insert(url.into(), compiled.into());
  }

  pub fn clear(&self) {
    self.compiled.lock().clear();
  }
}
