pub mod codeblock;

use std::{
  path::{Path, PathBuf},
  sync::LazyLock,
};

use comrak::{
  Arena,
  nodes::{NodeHeading, NodeValue},
  options::Options,
  parse_document,
};
use regex::Regex;
use walkdir::WalkDir;

/// Trailing markdown file extension, with optional trailing whitespace.
static MARKDOWN_EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\.(md|markdown)\s*$").unwrap_or_else(|e| {
    log::error!("Failed to compile MARKDOWN_EXTENSION_RE regex: {e}");
    never_matching_regex()
  })
});

/// Slugify a string for page matching.
///
/// Converts to lowercase, replaces every run of characters that are not
/// alphanumeric or `_` with a single dash, and trims leading/trailing dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  for c in text.to_lowercase().chars() {
    if c.is_alphanumeric() || c == '_' {
      slug.push(c);
    } else if !slug.ends_with('-') {
      slug.push('-');
    }
  }
  slug.trim_matches('-').to_string()
}

/// Strip a trailing `.md` or `.markdown` extension (case-insensitive).
#[must_use]
pub fn strip_markdown_extension(text: &str) -> &str {
  MARKDOWN_EXTENSION_RE
    .find(text)
    .map_or(text, |m| &text[..m.start()])
}

/// Split `text` at the first occurrence of `delimiter` that is not escaped
/// with a preceding `/`.
///
/// Returns `None` when no unescaped delimiter exists.
#[must_use]
pub fn split_unescaped(text: &str, delimiter: char) -> Option<(&str, &str)> {
  let mut previous = None;
  for (idx, c) in text.char_indices() {
    if c == delimiter && previous != Some('/') {
      return Some((&text[..idx], &text[idx + c.len_utf8()..]));
    }
    previous = Some(c);
  }
  None
}

/// Replace the escape sequence `/<delimiter>` with a literal `delimiter`.
#[must_use]
pub fn unescape(text: &str, delimiter: char) -> String {
  text.replace(&format!("/{delimiter}"), &delimiter.to_string())
}

/// Extract the first H1 heading from markdown content as the page title.
///
/// # Returns
///
/// `None` if no H1 heading is found.
#[must_use]
pub fn extract_title_from_markdown(content: &str) -> Option<String> {
  let arena = Arena::new();
  let mut options = Options::default();
  options.extension.table = true;
  options.extension.strikethrough = true;

  let root = parse_document(&arena, content, &options);

  for node in root.descendants() {
    if let NodeValue::Heading(NodeHeading { level: 1, .. }) =
      &node.data.borrow().value
    {
      let mut text = String::new();
      for child in node.descendants() {
        match &child.data.borrow().value {
          NodeValue::Text(t) => text.push_str(t),
          NodeValue::Code(code) => text.push_str(&code.literal),
          _ => {},
        }
      }
      let title = text.trim();
      if !title.is_empty() {
        return Some(title.to_string());
      }
    }
  }
  None
}

/// Collect all markdown files under `input_dir`, sorted by path.
#[must_use]
pub fn collect_markdown_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| {
      entry.file_type().is_file()
        && entry.path().extension().is_some_and(|ext| {
          ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")
        })
    })
    .map(walkdir::DirEntry::into_path)
    .collect();

  files.sort();
  log::debug!("Found {} markdown files in {}", files.len(), input_dir.display());
  files
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
#[must_use]
pub fn never_matching_regex() -> Regex {
  // Use a pattern that will never match anything because it asserts something
  // impossible - this pattern is guaranteed to be valid
  #[allow(
    clippy::expect_used,
    reason = "This pattern is guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}
