#![allow(clippy::expect_used, reason = "Fine in tests")]
mod common;

use interlinker_core::{DeadLinks, HtmlLinkParser};

#[test]
fn test_find_resolves_internal_links() {
  let site = common::site();
  let dead_links = DeadLinks::new();
  dead_links.set_file_src("./src/index.md");
  let parser = HtmlLinkParser::new(&dead_links);

  let html = r#"
    <p>Read <a href="/hello/">hello</a>, <a href="/blog/a-blog-post.md#top">a post</a>
    and <a href="https://example.com/">elsewhere</a>.</p>
    <p>Also <a href="/missing">this</a>.</p>
  "#;
  let links = parser.find(html, &site);

  let hrefs: Vec<&str> = links.iter().map(|link| link.href.as_str()).collect();
  assert_eq!(hrefs, vec!["/hello/", "/blog/a-blog-post", "/missing"]);
  assert!(links[0].exists);
  assert_eq!(links[1].page.as_deref(), Some("/blog/a-blog-post/"));
  assert!(!links[2].exists);

  assert_eq!(dead_links.len(), 1);
  assert_eq!(
    dead_links.sources("/missing"),
    Some(vec!["./src/index.md".to_string()])
  );
}

#[test]
fn test_parse_single_prefers_explicit_source() {
  let site = common::site();
  let dead_links = DeadLinks::new();
  dead_links.set_file_src("./src/other.md");

  let link = HtmlLinkParser::new(&dead_links)
    .with_source("./src/page.md")
    .parse_single("/gone", &site);

  assert!(!link.exists);
  assert!(!link.is_embed());
  assert_eq!(
    dead_links.sources("/gone"),
    Some(vec!["./src/page.md".to_string()])
  );
}

#[test]
fn test_dead_links_keep_the_href_as_written() {
  let site = common::site();
  let dead_links = DeadLinks::new();

  let link = HtmlLinkParser::new(&dead_links)
    .with_source("./src/page.md")
    .parse_single("/gone.md#section", &site);

  assert_eq!(link.href, "/gone");
  assert!(!link.exists);
  assert_eq!(dead_links.sources("/gone"), None);
  assert_eq!(
    dead_links.sources("/gone.md#section"),
    Some(vec!["./src/page.md".to_string()])
  );
}
