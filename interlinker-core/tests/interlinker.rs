#![allow(clippy::expect_used, reason = "Fine in tests")]
mod common;

use std::sync::Arc;

use async_trait::async_trait;
use interlinker_core::{
  Backlink,
  InterlinkError,
  Interlinker,
  InterlinkerOptions,
  InterlinkerOptionsBuilder,
  OutboundLink,
  PageDirectory,
  PageRecord,
  ReportFormat,
  ResolveContext,
  Resolver,
  TeraRenderer,
  WikilinkMeta,
  dead_links::REPORT_FILE_NAME,
};
use serde_json::json;

fn linking_site(a_content: &str) -> PageDirectory {
  common::directory(vec![
    common::page("a", "Page A").with_content(a_content),
    common::page("b", "B page").with_content("Hello from {{ title }}"),
  ])
}

fn render(interlinker: &Interlinker, site: &PageDirectory, url: &str) -> String {
  let page = site.find_by_file(url).expect("Page should exist");
  interlinker.render_page(&page).expect("Failed to render page")
}

#[tokio::test]
async fn test_end_to_end_backlinks() {
  let site = linking_site("See [[B page]] for details.");
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  let links = interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  assert_eq!(links.len(), 1);
  assert!(links[0].exists());
  assert_eq!(links[0].page(), Some("/b/"));

  let target = site.find_by_file("/b/").expect("Page b should exist");
  assert_eq!(target.backlinks(), vec![Backlink {
    url:   "/a/".to_string(),
    title: Some("Page A".to_string()),
  }]);

  let html = render(&interlinker, &site, "/a/");
  assert!(html.contains(r#"See <a href="/b/">B page</a> for details."#));
}

#[tokio::test]
async fn test_recomputing_is_idempotent() {
  let site = linking_site("[[B page]]");
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  let first = interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");
  let second = interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let first = first[0].as_wikilink().expect("Should be a wikilink");
  let second = second[0].as_wikilink().expect("Should be a wikilink");
  assert!(Arc::ptr_eq(first, second));

  let target = site.find_by_file("/b/").expect("Page b should exist");
  assert_eq!(target.backlinks().len(), 1);
}

#[tokio::test]
async fn test_dead_link_accounting() {
  let site = linking_site("[[missing]] and [[B page]] and [[missing]]");
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  let links = interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  assert_eq!(links.len(), 3);
  assert_eq!(interlinker.dead_links().len(), 1);
  assert_eq!(
    interlinker.dead_links().sources("[[missing]]"),
    Some(vec!["./src/a.md".to_string(), "./src/a.md".to_string()])
  );
  assert!(links[1].exists());

  let html = render(&interlinker, &site, "/a/");
  assert!(html.contains(r#"<a href="/stubs">missing</a>"#));
}

#[tokio::test]
async fn test_disabled_stubs_render_raw_notation() {
  let site = linking_site("Go to [[missing|somewhere]].");
  let interlinker = Interlinker::new(
    InterlinkerOptionsBuilder::new()
      .stub_url(None::<String>)
      .build(),
  );

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let html = render(&interlinker, &site, "/a/");
  assert!(html.contains("Go to [[missing|somewhere]]."));
  assert!(!html.contains("<a"));
}

#[tokio::test]
async fn test_anchor_and_title_escaping() {
  let site = common::directory(vec![
    common::page("a", "Page A").with_content("[[b#Part two|<Fish> & chips]]"),
    common::page("b", "B page"),
  ]);
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let link = interlinker
    .cache()
    .get("[[b#Part two|<Fish> & chips]]", None)
    .expect("Link should be cached");
  assert_eq!(
    link.content(),
    Some(r#"<a href="/b/#Part two">&lt;Fish&gt; &amp; chips</a>"#)
  );
}

#[tokio::test]
async fn test_html_anchors_are_resolved() {
  let site = linking_site(
    r#"<a href="/b">B</a> <a href="/nope">Nope</a> <code><a href="/hidden">x</a></code>"#,
  );
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  let links = interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  assert_eq!(links.len(), 2);
  assert!(links.iter().all(|link| matches!(link, OutboundLink::Html(_))));
  assert!(links[0].exists());
  assert!(!links[1].exists());
  assert!(!links[1].is_embed());

  assert_eq!(
    interlinker.dead_links().sources("/nope"),
    Some(vec!["./src/a.md".to_string()])
  );
  assert_eq!(
    interlinker.dead_links().console_report()[0],
    "Link (/nope) found pointing to non-existent page in:\n\t- ./src/a.md"
  );

  let target = site.find_by_file("/b/").expect("Page b should exist");
  assert_eq!(target.backlinks().len(), 1);
}

#[tokio::test]
async fn test_custom_resolvers() {
  struct Shout;

  #[async_trait]
  impl Resolver for Shout {
    async fn resolve(
      &self,
      link: &WikilinkMeta,
      _page: &PageRecord,
      _cx: &ResolveContext<'_>,
    ) -> interlinker_core::Result<Option<String>> {
      Ok(Some(link.name.to_uppercase()))
    }
  }

  let site = linking_site("[[issue:42]] and [[shout:quiet]]");
  let interlinker = Interlinker::new(
    InterlinkerOptionsBuilder::new()
      .resolver_fn("issue", |link, page| {
        format!("issue {} from {}", link.name, page.url)
      })
      .resolver("shout", Shout)
      .build(),
  );

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let html = render(&interlinker, &site, "/a/");
  assert!(html.contains("issue 42 from /a/ and QUIET"));
  assert!(interlinker.dead_links().is_empty());
}

#[tokio::test]
async fn test_unknown_resolver_fails_the_page() {
  let site = linking_site("[[nope:x]]");
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  let err = interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect_err("Unknown resolver must fail");
  let message = err.to_string();
  assert!(message.contains("[nope]"));
  assert!(message.contains("[[nope:x]]"));
  assert!(message.contains("./src/a.md"));
}

#[tokio::test]
async fn test_embeds_are_compiled_through_layouts() {
  let site = common::directory(vec![
    common::page("a", "Page A").with_content("![[B page]]\n\n![[c]]"),
    common::page("b", "B page").with_content("Hello from {{ title }}"),
    common::page("c", "C page")
      .with_content("Card for {{ title }}")
      .with_data("embedLayout", json!("card.html")),
  ]);

  let renderer = TeraRenderer::new();
  renderer
    .add_layout(
      "embed.html",
      r#"<div class="embed">{% block content %}{% endblock content %}</div>"#,
    )
    .expect("Failed to add layout");
  renderer
    .add_layout(
      "card.html",
      r#"<div class="card">{% block content %}{% endblock content %}</div>"#,
    )
    .expect("Failed to add layout");

  let interlinker = Interlinker::new(
    InterlinkerOptionsBuilder::new()
      .default_layout(Some("embed.html"))
      .build(),
  );
  interlinker.on_config(Arc::new(renderer));

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let html = render(&interlinker, &site, "/a/");
  assert!(html.contains(r#"<div class="embed">Hello from B page</div>"#));
  assert!(html.contains(r#"<div class="card">Card for C page</div>"#));
}

#[tokio::test]
async fn test_missing_embeds_render_placeholder() {
  let site = linking_site("![[nowhere]]");
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let html = render(&interlinker, &site, "/a/");
  assert!(html.contains("[UNABLE TO LOCATE EMBED]"));
  assert_eq!(interlinker.dead_links().len(), 1);
}

#[tokio::test]
#[allow(deprecated, reason = "Exercises the deprecated hook")]
async fn test_missing_embed_function() {
  let site = linking_site("![[nowhere]]");
  let interlinker = Interlinker::new(
    InterlinkerOptionsBuilder::new()
      .unable_to_locate_embed_fn(|slug| format!("nothing to embed on {slug}"))
      .build(),
  );

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let html = render(&interlinker, &site, "/a/");
  assert!(html.contains("nothing to embed on a"));
}

#[tokio::test]
async fn test_embed_without_renderer_fails_to_render() {
  let site = linking_site("![[B page]]");
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");

  let page = site.find_by_file("/a/").expect("Page a should exist");
  let err = interlinker
    .render_page(&page)
    .expect_err("Embed has no compiled content");
  assert!(matches!(err, InterlinkError::MissingEmbed { .. }));
}

#[tokio::test]
async fn test_pages_without_content_are_skipped() {
  let site = common::directory(vec![common::page("a", "Page A")]);
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  let links = interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");
  assert!(links.is_empty());

  let unknown = interlinker
    .compute_outbound_links("/unknown/", &site)
    .await
    .expect("Failed to compute links");
  assert!(unknown.is_empty());
}

#[tokio::test]
async fn test_untitled_pages_still_link() {
  let site = common::directory(vec![
    PageRecord::new("/untitled/")
      .with_file_slug("untitled")
      .with_file_path_stem("/untitled")
      .with_input_path("./src/untitled.md")
      .with_content("[[B page]]"),
    common::page("b", "B page"),
  ]);
  let interlinker = Interlinker::new(InterlinkerOptions::default());

  let links = interlinker
    .compute_outbound_links("/untitled/", &site)
    .await
    .expect("Failed to compute links");
  assert_eq!(links.len(), 1);

  let target = site.find_by_file("/b/").expect("Page b should exist");
  assert_eq!(target.backlinks(), vec![Backlink {
    url:   "/untitled/".to_string(),
    title: None,
  }]);
}

#[tokio::test]
async fn test_lifecycle_hooks() {
  let dir = tempfile::tempdir().expect("Failed to create temp dir");
  let site = linking_site("[[missing]] [[B page]]");
  let interlinker = Interlinker::new(
    InterlinkerOptionsBuilder::new()
      .dead_link_report(ReportFormat::Json)
      .build(),
  );

  interlinker
    .compute_outbound_links("/a/", &site)
    .await
    .expect("Failed to compute links");
  interlinker
    .after_build(dir.path())
    .expect("Failed to write report");

  let report = std::fs::read_to_string(dir.path().join(REPORT_FILE_NAME))
    .expect("Report should exist");
  let report: serde_json::Value =
    serde_json::from_str(&report).expect("Report should be JSON");
  assert_eq!(report, json!({ "[[missing]]": ["./src/a.md"] }));

  interlinker.before_watch();
  assert!(interlinker.cache().is_empty());
  assert!(interlinker.dead_links().is_empty());
}
