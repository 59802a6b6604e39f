#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::{fs, path::Path};

use interlinker::utils::{self, Site};
use interlinker_config::{Config, StubUrl};
use interlinker_core::ReportFormat;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).expect("Failed to create directory");
  }
  fs::write(path, content).expect("Failed to write file");
}

fn fixture() -> (TempDir, Config) {
  let dir = TempDir::new().expect("Failed to create temp dir");
  let input = dir.path().join("pages");
  let layouts = dir.path().join("layouts");

  write(
    &input,
    "index.md",
    "---\ntitle: Home\n---\nSee [[about]], [[Other name]] and [[missing]].\n\n![[snippet]]\n",
  );
  write(&input, "about.md", "# About us\n\nAbout page.\n");
  write(
    &input,
    "notes/aliased.md",
    "---\ntitle: Aliased\naliases:\n  - Other name\n---\nBack to [[index]].\n",
  );
  write(&input, "snippet.md", "Snippet **body**\n");
  write(
    &layouts,
    "embed.html",
    "<div class=\"embed\">\n\n{% block content %}{% endblock content %}\n\n</div>\n",
  );

  let config = Config {
    input_dir: Some(input),
    output_dir: dir.path().join("_site"),
    layouts_dir: Some(layouts),
    jobs: Some(2),
    default_layout: Some("embed.html".to_string()),
    dead_link_report: ReportFormat::Json,
    ..Config::default()
  };
  (dir, config)
}

#[test]
fn test_compute_links_fills_backlinks() {
  let (_dir, config) = fixture();
  let site = Site::load(&config).expect("Failed to load site");
  assert_eq!(site.directory.len(), 4);

  site.compute_links().expect("Failed to compute links");

  let about = site
    .directory
    .find_by_file("/about/")
    .expect("about page should exist");
  let backlinks = about.backlinks();
  assert_eq!(backlinks.len(), 1);
  assert_eq!(backlinks[0].url, "/");
  assert_eq!(backlinks[0].title.as_deref(), Some("Home"));

  let home = site.directory.find_by_file("/").expect("index should exist");
  assert_eq!(home.backlinks()[0].url, "/notes/aliased/");

  assert_eq!(
    site.interlinker.dead_links().gravestones().keys().collect::<Vec<_>>(),
    vec!["[[missing]]"]
  );
}

#[test]
fn test_build_writes_pages_and_report() {
  let (_dir, config) = fixture();
  utils::build(&config).expect("Build failed");

  let index = fs::read_to_string(config.output_dir.join("index.html"))
    .expect("index.html should be written");
  assert!(index.contains(r#"<a href="/about/">About us</a>"#));
  assert!(index.contains(r#"<a href="/notes/aliased/">Other name</a>"#));
  assert!(index.contains(r#"<a href="/stubs">missing</a>"#));
  assert!(index.contains(r#"<div class="embed">"#));
  assert!(index.contains("<strong>body</strong>"));

  let about = fs::read_to_string(config.output_dir.join("about/index.html"))
    .expect("about page should be written");
  assert!(about.contains("Pages linking here"));
  assert!(about.contains(">Home</a>"));

  assert!(config.output_dir.join("notes/aliased/index.html").exists());

  let report = fs::read_to_string(config.output_dir.join(".dead-links.json"))
    .expect("dead link report should be written");
  let report: serde_json::Value =
    serde_json::from_str(&report).expect("report should be JSON");
  let sources = report["[[missing]]"]
    .as_array()
    .expect("missing link should be reported");
  assert_eq!(sources.len(), 1);
  assert!(
    sources[0]
      .as_str()
      .is_some_and(|source| source.ends_with("index.md"))
  );
}

#[test]
fn test_disabled_stubs_leave_link_text() {
  let (_dir, mut config) = fixture();
  config.stub_url = StubUrl::Enabled(false);
  utils::build(&config).expect("Build failed");

  let index = fs::read_to_string(config.output_dir.join("index.html"))
    .expect("index.html should be written");
  assert!(index.contains("[[missing]]"));
  assert!(!index.contains("/stubs"));
}

#[test]
fn test_check_requires_input_dir() {
  let config = Config::default();
  assert!(utils::check(&config).is_err());
}
