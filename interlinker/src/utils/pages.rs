use std::{
  fs,
  path::{Component, Path},
};

use color_eyre::eyre::{Context, Result, bail};
use interlinker_core::{PageRecord, utils::extract_title_from_markdown};
use serde_json::{Map, Value};

/// Split a leading `---` delimited front matter block from `content`.
///
/// Returns the front matter (without delimiters) and the remaining body. A
/// block without a closing delimiter is treated as body text.
#[must_use]
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
  let Some(rest) = content
    .strip_prefix("---\n")
    .or_else(|| content.strip_prefix("---\r\n"))
  else {
    return (None, content);
  };

  let mut offset = 0;
  for line in rest.split_inclusive('\n') {
    if line.trim_end() == "---" {
      return (Some(&rest[..offset]), &rest[offset + line.len()..]);
    }
    offset += line.len();
  }

  (None, content)
}

/// Parse YAML front matter into a JSON object.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or is not a mapping with string
/// keys.
pub fn parse_front_matter(front_matter: &str) -> Result<Map<String, Value>> {
  let yaml: serde_yaml::Value =
    serde_yaml::from_str(front_matter).wrap_err("Invalid YAML front matter")?;
  if yaml.is_null() {
    return Ok(Map::new());
  }

  match serde_json::to_value(yaml).wrap_err("Unsupported front matter value")? {
    Value::Object(map) => Ok(map),
    other => bail!("Front matter must be a mapping, found: {other}"),
  }
}

/// Url, slug and file path stem of a page at `rel_path` (relative to the
/// input directory).
///
/// `index` pages take the url and slug of their directory.
#[must_use]
pub fn page_location(rel_path: &Path) -> (String, String, String) {
  let segments: Vec<String> = rel_path
    .with_extension("")
    .components()
    .filter_map(|component| {
      match component {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
      }
    })
    .collect();

  let file_path_stem = format!("/{}", segments.join("/"));
  let (dirs, stem) = segments.split_at(segments.len().saturating_sub(1));
  let stem = stem.first().map_or("", String::as_str);

  if stem == "index" {
    let url = if dirs.is_empty() {
      "/".to_string()
    } else {
      format!("/{}/", dirs.join("/"))
    };
    let slug = dirs.last().map_or_else(|| "index".to_string(), Clone::clone);
    (url, slug, file_path_stem)
  } else {
    let url = format!("{file_path_stem}/");
    (url, stem.to_string(), file_path_stem)
  }
}

/// Load the page at `path` inside `input_dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its front matter is
/// invalid.
pub fn load_page(input_dir: &Path, path: &Path) -> Result<PageRecord> {
  let raw = fs::read_to_string(path)
    .wrap_err_with(|| format!("Failed to read page: {}", path.display()))?;
  let (front_matter, body) = split_front_matter(&raw);
  let mut data = match front_matter {
    Some(front_matter) => {
      parse_front_matter(front_matter).wrap_err_with(|| {
        format!("Failed to parse front matter of {}", path.display())
      })?
    },
    None => Map::new(),
  };

  if !data.contains_key("title")
    && let Some(title) = extract_title_from_markdown(body)
  {
    data.insert("title".to_string(), Value::String(title));
  }

  let rel_path = path.strip_prefix(input_dir).wrap_err_with(|| {
    format!(
      "Page {} is outside of {}",
      path.display(),
      input_dir.display()
    )
  })?;
  let (url, file_slug, file_path_stem) = page_location(rel_path);
  let input_path = Path::new(".").join(input_dir).join(rel_path);

  let mut page = PageRecord::new(url)
    .with_file_slug(file_slug)
    .with_file_path_stem(file_path_stem)
    .with_input_path(input_path.to_string_lossy())
    .with_content(body);
  page.data = data;
  Ok(page)
}

/// Load every markdown page under `input_dir`.
///
/// # Errors
///
/// Returns an error if a page cannot be loaded, or two pages share a url.
pub fn load_pages(input_dir: &Path) -> Result<Vec<PageRecord>> {
  if !input_dir.is_dir() {
    bail!("Input directory does not exist: {}", input_dir.display());
  }

  let mut pages = Vec::new();
  for path in interlinker_core::utils::collect_markdown_files(input_dir) {
    let page = load_page(input_dir, &path)?;
    if let Some(existing) = pages.iter().find(|p: &&PageRecord| p.url == page.url) {
      bail!(
        "Pages {} and {} both render to {}",
        existing.input_path,
        page.input_path,
        page.url
      );
    }
    pages.push(page);
  }

  log::info!("Loaded {} pages from {}", pages.len(), input_dir.display());
  Ok(pages)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use std::path::PathBuf;

  use super::*;

  #[test]
  fn test_split_front_matter() {
    let (front, body) = split_front_matter("---\ntitle: Hi\n---\nBody\n");
    assert_eq!(front, Some("title: Hi\n"));
    assert_eq!(body, "Body\n");

    let (front, body) = split_front_matter("---\n---\nBody");
    assert_eq!(front, Some(""));
    assert_eq!(body, "Body");

    let (front, body) = split_front_matter("No front matter\n---\n");
    assert_eq!(front, None);
    assert_eq!(body, "No front matter\n---\n");

    let (front, _) = split_front_matter("---\nunterminated: true\n");
    assert_eq!(front, None);
  }

  #[test]
  fn test_parse_front_matter() {
    let data = parse_front_matter("title: Hi\naliases:\n  - one\n  - two\n")
      .expect("Failed to parse");
    assert_eq!(data["title"], Value::String("Hi".to_string()));
    assert_eq!(data["aliases"].as_array().map(Vec::len), Some(2));

    assert!(parse_front_matter("").expect("Empty is fine").is_empty());
    assert!(parse_front_matter("- a list").is_err());
  }

  #[test]
  fn test_page_location() {
    let cases = [
      ("index.md", "/", "index", "/index"),
      ("about.md", "/about/", "about", "/about"),
      ("blog/index.md", "/blog/", "blog", "/blog/index"),
      ("blog/first-post.markdown", "/blog/first-post/", "first-post", "/blog/first-post"),
    ];

    for (path, url, slug, stem) in cases {
      assert_eq!(
        page_location(&PathBuf::from(path)),
        (url.to_string(), slug.to_string(), stem.to_string()),
        "location of {path}"
      );
    }
  }
}
