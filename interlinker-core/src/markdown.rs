//! Inline wikilink rendering for markdown sources.
//!
//! After [`crate::Interlinker::compute_outbound_links`] has resolved a page,
//! its notations are looked up in the link cache by raw text and replaced
//! with their resolved output before the markdown itself is rendered.
use std::sync::Arc;

use crate::{
  cache::LinkCache,
  error::{InterlinkError, Result},
  resolvers::{self, DEFAULT},
  template::markdown_to_html,
  types::WikilinkMeta,
  utils::codeblock::code_ranges,
};

/// A cached wikilink found at a position in the source.
#[derive(Debug, Clone)]
pub struct InlineMatch {
  /// Byte length of the notation in the source.
  pub len:  usize,
  pub link: Arc<WikilinkMeta>,
}

/// Match a wikilink notation starting exactly at byte `pos` of `src`.
///
/// The notation runs from `[[` or `![[` to the first `]]`. Only notations
/// already present in `cache` are matched.
#[must_use]
pub fn match_notation(
  src: &str,
  pos: usize,
  cache: &LinkCache,
  file_path_stem: Option<&str>,
) -> Option<InlineMatch> {
  let rest = src.get(pos..)?;
  let opener = if rest.starts_with("![[") {
    3
  } else if rest.starts_with("[[") {
    2
  } else {
    return None;
  };

  let len = rest[opener..].find("]]")? + opener + 2;
  let link = cache.get(&rest[..len], file_path_stem)?;
  Some(InlineMatch { len, link })
}

/// Output of a wikilink.
///
/// Resolver output is used when present. Otherwise plain `default` links get
/// their anchor markup built directly, and anything else renders as its raw
/// notation.
///
/// # Errors
///
/// Returns [`InterlinkError::MissingEmbed`] for an embed of an existing page
/// without compiled content.
pub fn render_link(link: &WikilinkMeta) -> Result<String> {
  if let Some(content) = link.content() {
    return Ok(content.to_string());
  }

  if link.is_embed && link.exists {
    return Err(InterlinkError::MissingEmbed {
      link: link.link.clone(),
    });
  }

  if link.resolver == DEFAULT {
    return Ok(resolvers::link_html(link));
  }

  Ok(link.link.clone())
}

/// Replace every cached notation in `src` with its rendered output.
///
/// Notations inside fenced code blocks and inline code spans are left as is.
///
/// # Errors
///
/// Returns the first error produced by [`render_link`].
pub fn expand_wikilinks(
  src: &str,
  cache: &LinkCache,
  file_path_stem: Option<&str>,
) -> Result<String> {
  let code = code_ranges(src);
  let mut code_idx = 0;
  let mut out = String::with_capacity(src.len());
  let mut copied = 0;
  let mut pos = 0;

  while pos < src.len() {
    while code.get(code_idx).is_some_and(|range| range.end <= pos) {
      code_idx += 1;
    }
    if let Some(range) = code.get(code_idx)
      && range.start <= pos
    {
      pos = range.end;
      continue;
    }

    if let Some(found) = match_notation(src, pos, cache, file_path_stem) {
      out.push_str(&src[copied..pos]);
      out.push_str(&render_link(&found.link)?);
      pos += found.len;
      copied = pos;
      continue;
    }

    pos += src[pos..].chars().next().map_or(1, char::len_utf8);
  }

  out.push_str(&src[copied..]);
  Ok(out)
}

/// Render markdown to HTML with cached wikilinks expanded.
///
/// # Errors
///
/// Returns the first error produced by [`render_link`].
pub fn render_markdown(
  src: &str,
  cache: &LinkCache,
  file_path_stem: Option<&str>,
) -> Result<String> {
  let expanded = expand_wikilinks(src, cache, file_path_stem)?;
  Ok(markdown_to_html(&expanded))
}
